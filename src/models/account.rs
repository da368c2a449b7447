use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub const NAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 255;
pub const PASSWORD_MIN_LEN: usize = 6;

/// アカウント
///
/// ダイジェスト類はすべてハッシュ値。平文のパスワード・トークンは保持しない。
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_digest: String,
    #[serde(skip)]
    pub remember_digest: Option<String>,
    #[serde(skip)]
    pub activation_digest: Option<String>,
    pub activated: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub activated_at: Option<OffsetDateTime>,
    #[serde(skip)]
    pub reset_digest: Option<String>,
    #[serde(skip)]
    pub reset_sent_at: Option<OffsetDateTime>,
    pub admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Account {
    /// 未永続化の新規アカウントを組み立てる
    ///
    /// メールアドレスは正規化してから保持する
    pub fn new(name: &str, email: &str, password_digest: String) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_digest,
            remember_digest: None,
            activation_digest: None,
            activated: false,
            activated_at: None,
            reset_digest: None,
            reset_sent_at: None,
            admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// `now` 時点でリセットトークンが期限切れか
    ///
    /// リセット未申請の場合も期限切れとして扱う
    pub fn reset_expired_at(&self, now: OffsetDateTime, ttl: Duration) -> bool {
        match self.reset_sent_at {
            Some(sent_at) => now - sent_at > ttl,
            None => true,
        }
    }
}

// name: 空白のみは不可
// email: ドメインはドット区切りのTLD必須

/// 登録入力
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAccount {
    #[garde(pattern(r"\S"), length(chars, max = 50))]
    pub name: String,
    #[garde(pattern(r"(?i)^[\w+\-.]+@[a-z\d\-.]+\.[a-z]+$"), length(max = 255))]
    pub email: String,
    #[garde(length(min = 6))]
    pub password: String,
}

/// プロフィール更新入力
///
/// パスワードは指定された場合のみ変更する
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AccountUpdate {
    #[garde(pattern(r"\S"), length(chars, max = 50))]
    pub name: String,
    #[garde(pattern(r"(?i)^[\w+\-.]+@[a-z\d\-.]+\.[a-z]+$"), length(max = 255))]
    pub email: String,
    #[garde(length(min = 6))]
    pub password: Option<String>,
}

/// メールアドレスの正規化（前後の空白除去・小文字化）
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(name: &str, email: &str, password: &str) -> NewAccount {
        NewAccount {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Foo@ExAMPle.CoM "), "foo@example.com");
    }

    #[test]
    fn test_new_account_normalizes_email() {
        let account = Account::new("Example User", "USER@Example.COM", "digest".to_string());
        assert_eq!(account.email, "user@example.com");
        assert!(!account.activated);
        assert!(account.remember_digest.is_none());
    }

    #[test]
    fn test_validate_valid_account() {
        let input = new_account("Example User", "user@example.com", "foobar");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_validate_blank_name() {
        let input = new_account("", "user@example.com", "foobar");
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_whitespace_name() {
        let input = new_account("   ", "user@example.com", "foobar");
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_long_name() {
        let input = new_account(&"a".repeat(NAME_MAX_LEN + 1), "user@example.com", "foobar");
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_long_email() {
        let email = format!("{}@example.com", "a".repeat(EMAIL_MAX_LEN));
        let input = new_account("Example User", &email, "foobar");
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_email() {
        for email in [
            "user_at_foo.org",
            "user@",
            "@example.com",
            "user@example",
            "user@localhost",
            "user@example,com",
            "foo@bar_baz.com",
        ] {
            let input = new_account("Example User", email, "foobar");
            assert!(input.validate().is_err(), "{email} should be invalid");
        }
    }

    #[test]
    fn test_validate_valid_emails() {
        for email in ["user@example.com", "USER@foo.COM", "A_US-ER@foo.bar.org", "alice+bob@baz.cn"] {
            let input = new_account("Example User", email, "foobar");
            assert!(input.validate().is_ok(), "{email} should be valid");
        }
    }

    #[test]
    fn test_update_without_password_is_valid() {
        let update = AccountUpdate {
            name: "New Name".to_string(),
            email: "new@example.com".to_string(),
            password: None,
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_update_short_password_is_invalid() {
        let update = AccountUpdate {
            name: "New Name".to_string(),
            email: "new@example.com".to_string(),
            password: Some("short".to_string()),
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_validate_short_password() {
        let input = new_account("Example User", "user@example.com", "a".repeat(5).as_str());
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_reset_expired_at() {
        let mut account = Account::new("Example User", "user@example.com", "digest".to_string());
        let now = OffsetDateTime::now_utc();
        let ttl = Duration::hours(2);

        assert!(account.reset_expired_at(now, ttl));

        account.reset_sent_at = Some(now);
        assert!(!account.reset_expired_at(now, ttl));
        assert!(!account.reset_expired_at(now + Duration::hours(1), ttl));
        assert!(account.reset_expired_at(now + Duration::hours(3), ttl));
    }
}
