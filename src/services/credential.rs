use time::OffsetDateTime;

use crate::config::CredentialPolicy;
use crate::error::AppError;
use crate::models::Account;
use crate::models::account::PASSWORD_MIN_LEN;
use crate::repositories::AccountStore;
use crate::services::digest;

/// 認証情報・トークン管理サービス
///
/// すべての操作は対象アカウントを明示的に受け取る。
/// 更新はコピーに対して行い、保存に成功してから呼び出し元のアカウントへ反映する。
/// 保存に失敗した場合、呼び出し元のアカウントは変更されない。
///
/// # Security
/// - 平文トークンは戻り値として一度だけ返し、ログには出力しない
#[derive(Clone)]
pub struct CredentialService<S> {
    store: S,
    policy: CredentialPolicy,
}

impl<S: AccountStore> CredentialService<S> {
    /// 新しい CredentialService を作成
    pub fn new(store: S, policy: CredentialPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }

    pub fn hash(&self, secret: &str) -> Result<String, AppError> {
        digest::hash(secret, &self.policy.hash_cost)
    }

    pub fn generate_token(&self) -> String {
        digest::generate_token(self.policy.token_bytes)
    }

    /// ログイン状態保持用トークンを発行
    pub async fn issue_remember_token(&self, account: &mut Account) -> Result<String, AppError> {
        let token = self.generate_token();
        let mut updated = account.clone();
        updated.remember_digest = Some(self.hash(&token)?);

        self.commit(account, updated).await?;

        tracing::info!(account_id = %account.id, "remember トークン発行");
        Ok(token)
    }

    pub fn authenticate_remember(&self, account: &Account, token: &str) -> bool {
        digest::verify(token, account.remember_digest.as_deref())
    }

    /// remember ダイジェストを破棄（ログアウト）
    pub async fn forget(&self, account: &mut Account) -> Result<(), AppError> {
        let mut updated = account.clone();
        updated.remember_digest = None;

        self.commit(account, updated).await?;

        tracing::info!(account_id = %account.id, "remember トークン破棄");
        Ok(())
    }

    /// 有効化トークンを発行
    ///
    /// 作成前のアカウントに対して呼ぶ。保存は呼び出し側（登録処理）が行う。
    pub fn issue_activation(&self, account: &mut Account) -> Result<String, AppError> {
        let token = self.generate_token();
        account.activation_digest = Some(self.hash(&token)?);
        Ok(token)
    }

    /// アカウントを有効化
    ///
    /// 既に有効化済みで、トークンが一致する場合は何も変更せず true を返す
    pub async fn activate(&self, account: &mut Account, token: &str) -> Result<bool, AppError> {
        if !digest::verify(token, account.activation_digest.as_deref()) {
            tracing::warn!(account_id = %account.id, "有効化失敗: トークン不一致");
            return Ok(false);
        }

        if account.activated {
            tracing::info!(account_id = %account.id, "有効化済みアカウント");
            return Ok(true);
        }

        let mut updated = account.clone();
        updated.activated = true;
        updated.activated_at = Some(OffsetDateTime::now_utc());

        self.commit(account, updated).await?;

        tracing::info!(account_id = %account.id, "アカウント有効化完了");
        Ok(true)
    }

    /// パスワードリセットトークンを発行
    pub async fn issue_reset(&self, account: &mut Account) -> Result<String, AppError> {
        let token = self.generate_token();
        let mut updated = account.clone();
        updated.reset_digest = Some(self.hash(&token)?);
        updated.reset_sent_at = Some(OffsetDateTime::now_utc());

        self.commit(account, updated).await?;

        tracing::info!(account_id = %account.id, "リセットトークン発行");
        Ok(token)
    }

    pub fn reset_expired(&self, account: &Account) -> bool {
        account.reset_expired_at(OffsetDateTime::now_utc(), self.policy.reset_ttl)
    }

    /// リセットトークンを検証し、パスワードを更新
    ///
    /// # Security
    /// - トークン・新パスワードはログに出力しない
    pub async fn reset_password(
        &self,
        account: &mut Account,
        token: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if account.reset_digest.is_none() {
            tracing::warn!(account_id = %account.id, "リセット未申請");
            return Err(AppError::TokenInvalid);
        }

        if self.reset_expired(account) {
            tracing::warn!(account_id = %account.id, "期限切れトークン");
            return Err(AppError::TokenExpired);
        }

        if !digest::verify(token, account.reset_digest.as_deref()) {
            tracing::warn!(account_id = %account.id, "リセット失敗: トークン不一致");
            return Err(AppError::TokenInvalid);
        }

        validate_password(new_password)?;

        let mut updated = account.clone();
        updated.password_digest = self.hash(new_password)?;
        updated.reset_digest = None;
        updated.reset_sent_at = None;

        self.commit(account, updated).await?;

        tracing::info!(account_id = %account.id, "パスワードリセット完了");
        Ok(())
    }

    async fn commit(&self, account: &mut Account, mut updated: Account) -> Result<(), AppError> {
        updated.updated_at = OffsetDateTime::now_utc();
        self.store.save(&updated).await?;
        *account = updated;
        Ok(())
    }
}

/// パスワードの長さチェック
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(AppError::Validation(format!(
            "パスワードは{PASSWORD_MIN_LEN}文字以上で入力してください"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::repositories::MemoryAccountStore;

    async fn setup() -> (CredentialService<MemoryAccountStore>, MemoryAccountStore, Account) {
        let store = MemoryAccountStore::new();
        let service = CredentialService::new(store.clone(), CredentialPolicy::for_tests());
        let mut account = Account::new(
            "Example User",
            "user@example.com",
            service.hash("foobar").unwrap(),
        );
        service.issue_activation(&mut account).unwrap();
        store.insert(&account).await.unwrap();
        (service, store, account)
    }

    #[tokio::test]
    async fn test_remember_token_round_trip() {
        let (service, store, mut account) = setup().await;

        let token = service.issue_remember_token(&mut account).await.unwrap();
        assert!(service.authenticate_remember(&account, &token));
        assert!(!service.authenticate_remember(&account, "wrong-token"));

        // ダイジェストのみ保存される
        let stored = store.load(account.id).await.unwrap();
        assert_eq!(stored.remember_digest, account.remember_digest);
        assert_ne!(stored.remember_digest.as_deref(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn test_authenticate_remember_without_digest() {
        let (service, _store, account) = setup().await;
        assert!(!service.authenticate_remember(&account, ""));
    }

    #[tokio::test]
    async fn test_forget_invalidates_remember_token() {
        let (service, store, mut account) = setup().await;

        let token = service.issue_remember_token(&mut account).await.unwrap();
        service.forget(&mut account).await.unwrap();

        assert!(!service.authenticate_remember(&account, &token));
        assert!(store.load(account.id).await.unwrap().remember_digest.is_none());
    }

    #[tokio::test]
    async fn test_reissued_remember_token_replaces_previous() {
        let (service, _store, mut account) = setup().await;

        let first = service.issue_remember_token(&mut account).await.unwrap();
        let second = service.issue_remember_token(&mut account).await.unwrap();

        assert!(!service.authenticate_remember(&account, &first));
        assert!(service.authenticate_remember(&account, &second));
    }

    #[tokio::test]
    async fn test_activate_with_valid_token() {
        let store = MemoryAccountStore::new();
        let service = CredentialService::new(store.clone(), CredentialPolicy::for_tests());
        let mut account = Account::new("Example User", "user@example.com", "digest".to_string());
        let token = service.issue_activation(&mut account).unwrap();
        store.insert(&account).await.unwrap();

        assert!(service.activate(&mut account, &token).await.unwrap());
        assert!(account.activated);
        assert!(account.activated_at.is_some());
        assert!(store.load(account.id).await.unwrap().activated);
    }

    #[tokio::test]
    async fn test_activate_with_wrong_token() {
        let (service, store, mut account) = setup().await;

        assert!(!service.activate(&mut account, "wrong-token").await.unwrap());
        assert!(!account.activated);
        assert!(account.activated_at.is_none());
        assert!(!store.load(account.id).await.unwrap().activated);
    }

    #[tokio::test]
    async fn test_activate_twice_is_noop() {
        let store = MemoryAccountStore::new();
        let service = CredentialService::new(store.clone(), CredentialPolicy::for_tests());
        let mut account = Account::new("Example User", "user@example.com", "digest".to_string());
        let token = service.issue_activation(&mut account).unwrap();
        store.insert(&account).await.unwrap();

        assert!(service.activate(&mut account, &token).await.unwrap());
        let activated_at = account.activated_at;

        // 2回目はストアに触れない
        store.set_unavailable(true);
        assert!(service.activate(&mut account, &token).await.unwrap());
        assert_eq!(account.activated_at, activated_at);
    }

    #[tokio::test]
    async fn test_reset_expired_window() {
        let (service, _store, mut account) = setup().await;

        assert!(service.reset_expired(&account));

        service.issue_reset(&mut account).await.unwrap();
        assert!(!service.reset_expired(&account));

        let now = OffsetDateTime::now_utc();
        assert!(account.reset_expired_at(now + Duration::hours(3), Duration::hours(2)));
    }

    #[tokio::test]
    async fn test_reset_password_success() {
        let (service, store, mut account) = setup().await;

        let token = service.issue_reset(&mut account).await.unwrap();
        service
            .reset_password(&mut account, &token, "newpass")
            .await
            .unwrap();

        assert!(digest::verify("newpass", Some(&account.password_digest)));
        assert!(account.reset_digest.is_none());
        assert!(account.reset_sent_at.is_none());

        let stored = store.load(account.id).await.unwrap();
        assert!(digest::verify("newpass", Some(&stored.password_digest)));
        assert!(!digest::verify("foobar", Some(&stored.password_digest)));
    }

    #[tokio::test]
    async fn test_reset_token_is_single_use() {
        let (service, _store, mut account) = setup().await;

        let token = service.issue_reset(&mut account).await.unwrap();
        service
            .reset_password(&mut account, &token, "newpass")
            .await
            .unwrap();

        let result = service.reset_password(&mut account, &token, "another").await;
        assert!(matches!(result, Err(AppError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_reset_password_expired() {
        let (service, store, mut account) = setup().await;

        let token = service.issue_reset(&mut account).await.unwrap();
        account.reset_sent_at = Some(OffsetDateTime::now_utc() - Duration::hours(3));
        store.save(&account).await.unwrap();
        let digest_before = account.password_digest.clone();

        let result = service.reset_password(&mut account, &token, "newpass").await;
        assert!(matches!(result, Err(AppError::TokenExpired)));
        assert_eq!(account.password_digest, digest_before);
        assert_eq!(
            store.load(account.id).await.unwrap().password_digest,
            digest_before
        );
    }

    #[tokio::test]
    async fn test_reset_password_wrong_token() {
        let (service, _store, mut account) = setup().await;

        service.issue_reset(&mut account).await.unwrap();
        let result = service
            .reset_password(&mut account, "wrong-token", "newpass")
            .await;
        assert!(matches!(result, Err(AppError::TokenInvalid)));
        assert!(account.reset_digest.is_some());
    }

    #[tokio::test]
    async fn test_reset_password_without_request() {
        let (service, _store, mut account) = setup().await;

        let result = service.reset_password(&mut account, "any", "newpass").await;
        assert!(matches!(result, Err(AppError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_reset_password_too_short() {
        let (service, _store, mut account) = setup().await;

        let token = service.issue_reset(&mut account).await.unwrap();
        let result = service.reset_password(&mut account, &token, "short").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(account.reset_digest.is_some());
    }

    #[tokio::test]
    async fn test_caller_account_matches_stored_row() {
        let (service, store, mut account) = setup().await;
        let created_at = account.updated_at;

        service.issue_remember_token(&mut account).await.unwrap();
        assert_eq!(store.load(account.id).await.unwrap(), account);
        assert!(account.updated_at >= created_at);

        service.forget(&mut account).await.unwrap();
        assert_eq!(store.load(account.id).await.unwrap(), account);
    }

    #[tokio::test]
    async fn test_persistence_failure_leaves_account_unchanged() {
        let (service, store, mut account) = setup().await;
        let before = account.clone();

        store.set_unavailable(true);
        let result = service.issue_remember_token(&mut account).await;

        assert!(matches!(result, Err(AppError::Persistence(_))));
        assert_eq!(account, before);
    }
}
