use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::repositories::AccountRepository;
use crate::services::{
    AccountService, AuthService, CredentialService, EmailService, PasswordResetService,
    RegistrationService,
};

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// Clone は必須（axum が内部で clone するため）。
#[derive(Clone)]
pub struct AppState {
    /// アプリケーション設定（Arc で共有）
    pub config: Arc<Config>,
    /// アカウントリポジトリ
    pub account_repo: AccountRepository,
    /// 認証情報・トークン管理
    pub credentials: CredentialService<AccountRepository>,
    /// ログイン認証（ダミーダイジェストは起動時に一度だけ生成）
    pub auth: AuthService<AccountRepository>,
    /// メールサービス
    pub email_service: EmailService,
}

impl AppState {
    /// 新しい AppState を作成
    pub fn new(db_pool: PgPool, config: Config) -> Self {
        let config = Arc::new(config);
        let account_repo = AccountRepository::new(db_pool);
        let credentials = CredentialService::new(account_repo.clone(), config.credential_policy());
        let auth = AuthService::new(account_repo.clone(), &credentials.policy().hash_cost);
        let email_service = EmailService::new(
            config.app_url_base.clone(),
            config.smtp_from_address.clone(),
        );

        tracing::info!(
            hash_memory_kib = credentials.policy().hash_cost.memory_kib,
            hash_iterations = credentials.policy().hash_cost.iterations,
            reset_ttl_secs = credentials.policy().reset_ttl.whole_seconds(),
            "認証情報ポリシー設定完了"
        );

        Self {
            config,
            account_repo,
            credentials,
            auth,
            email_service,
        }
    }

    pub fn auth_service(&self) -> &AuthService<AccountRepository> {
        &self.auth
    }

    pub fn account_service(&self) -> AccountService<AccountRepository> {
        AccountService::new(self.account_repo.clone(), self.credentials.clone())
    }

    pub fn registration_service(&self) -> RegistrationService<AccountRepository, EmailService> {
        RegistrationService::new(
            self.account_repo.clone(),
            self.credentials.clone(),
            self.email_service.clone(),
        )
    }

    pub fn password_reset_service(&self) -> PasswordResetService<AccountRepository, EmailService> {
        PasswordResetService::new(
            self.account_repo.clone(),
            self.credentials.clone(),
            self.email_service.clone(),
        )
    }
}
