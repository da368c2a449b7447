use std::future::Future;

use crate::error::AppError;
use crate::models::Account;

/// 平文トークンをユーザーへ届ける通知手段
///
/// 配送の失敗はダイジェスト発行を巻き戻さない（呼び出し側はログ出力のみ）
pub trait Notifier: Clone + Send + Sync + 'static {
    fn send_activation(
        &self,
        account: &Account,
        token: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn send_password_reset(
        &self,
        account: &Account,
        token: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// メール送信サービス（送信はせずログ出力のみ）
#[derive(Clone)]
pub struct EmailService {
    app_url_base: String,
    from_address: Option<String>,
}

impl EmailService {
    /// 新しい EmailService を作成
    pub fn new(app_url_base: String, from_address: Option<String>) -> Self {
        Self {
            app_url_base: app_url_base.trim_end_matches('/').to_string(),
            from_address,
        }
    }

    /// アカウント有効化URLを構築
    pub fn activation_url(&self, account: &Account, token: &str) -> String {
        format!(
            "{}/account-activation?email={}&token={}",
            self.app_url_base,
            urlencoding::encode(&account.email),
            token
        )
    }

    /// パスワードリセットURLを構築
    pub fn password_reset_url(&self, account: &Account, token: &str) -> String {
        format!(
            "{}/password-reset?email={}&token={}",
            self.app_url_base,
            urlencoding::encode(&account.email),
            token
        )
    }
}

impl Notifier for EmailService {
    async fn send_activation(&self, account: &Account, token: &str) -> Result<(), AppError> {
        tracing::info!(
            to = %account.email,
            from = ?self.from_address,
            "アカウント有効化メール送信（開発モード）"
        );
        tracing::debug!("有効化URL: {}", self.activation_url(account, token));
        Ok(())
    }

    async fn send_password_reset(&self, account: &Account, token: &str) -> Result<(), AppError> {
        tracing::info!(
            to = %account.email,
            from = ?self.from_address,
            "パスワードリセットメール送信（開発モード）"
        );
        tracing::debug!("リセットURL: {}", self.password_reset_url(account, token));
        Ok(())
    }
}
