use secrecy::SecretBox;
use serde::Deserialize;
use time::Duration;

use crate::services::digest::HashCost;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database_url: SecretBox<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS で許可するオリジン（未設定なら CORS レイヤーを付けない）
    #[serde(default)]
    pub cors_allowed_origin: Option<String>,

    // メール本文に埋め込むリンクのベースURL
    #[serde(default = "default_app_url_base")]
    pub app_url_base: String,
    #[serde(default)]
    pub smtp_from_address: Option<String>,

    // パスワードハッシュのコスト設定
    #[serde(default = "default_password_hash_memory_kib")]
    pub password_hash_memory_kib: u32,
    #[serde(default = "default_password_hash_iterations")]
    pub password_hash_iterations: u32,
    /// true の場合は最小コストでハッシュ化する（テスト環境専用）
    #[serde(default)]
    pub password_hash_min_cost: bool,

    // トークン設定
    #[serde(default = "default_password_reset_ttl_secs")]
    pub password_reset_ttl_secs: i64,
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_APP_URL_BASE: &str = "http://localhost:3000";
const DEFAULT_PASSWORD_RESET_TTL_SECS: i64 = 2 * 60 * 60;
const DEFAULT_TOKEN_BYTES: usize = 32;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_app_url_base() -> String {
    DEFAULT_APP_URL_BASE.to_string()
}

fn default_password_hash_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

fn default_password_hash_iterations() -> u32 {
    argon2::Params::DEFAULT_T_COST
}

fn default_password_reset_ttl_secs() -> i64 {
    DEFAULT_PASSWORD_RESET_TTL_SECS
}

fn default_token_bytes() -> usize {
    DEFAULT_TOKEN_BYTES
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// 認証情報サービスに注入するポリシーを構築
    pub fn credential_policy(&self) -> CredentialPolicy {
        let hash_cost = if self.password_hash_min_cost {
            HashCost::MIN
        } else {
            HashCost {
                memory_kib: self.password_hash_memory_kib,
                iterations: self.password_hash_iterations,
            }
        };

        CredentialPolicy {
            hash_cost,
            reset_ttl: Duration::seconds(self.password_reset_ttl_secs),
            token_bytes: self.token_bytes,
        }
    }
}

/// ハッシュコスト・有効期限・トークン長の設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CredentialPolicy {
    pub hash_cost: HashCost,
    /// パスワードリセットトークンの有効期間
    pub reset_ttl: Duration,
    /// トークンのランダムバイト数（16未満は16に切り上げ）
    pub token_bytes: usize,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            hash_cost: HashCost::default(),
            reset_ttl: Duration::seconds(DEFAULT_PASSWORD_RESET_TTL_SECS),
            token_bytes: DEFAULT_TOKEN_BYTES,
        }
    }
}

impl CredentialPolicy {
    /// テスト用（最小コスト）
    pub fn for_tests() -> Self {
        Self {
            hash_cost: HashCost::MIN,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_cost: bool) -> Config {
        Config {
            database_url: SecretBox::new(Box::new("postgres://localhost/socialite".to_string())),
            host: default_host(),
            port: default_port(),
            cors_allowed_origin: None,
            app_url_base: default_app_url_base(),
            smtp_from_address: None,
            password_hash_memory_kib: 4096,
            password_hash_iterations: 3,
            password_hash_min_cost: min_cost,
            password_reset_ttl_secs: 600,
            token_bytes: 24,
        }
    }

    #[test]
    fn test_credential_policy_uses_configured_cost() {
        let policy = config(false).credential_policy();
        assert_eq!(policy.hash_cost.memory_kib, 4096);
        assert_eq!(policy.hash_cost.iterations, 3);
        assert_eq!(policy.reset_ttl, Duration::minutes(10));
        assert_eq!(policy.token_bytes, 24);
    }

    #[test]
    fn test_credential_policy_min_cost_overrides() {
        let policy = config(true).credential_policy();
        assert_eq!(policy.hash_cost, HashCost::MIN);
    }

    #[test]
    fn test_default_reset_window_is_two_hours() {
        assert_eq!(CredentialPolicy::default().reset_ttl, Duration::hours(2));
    }
}
