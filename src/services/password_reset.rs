use crate::error::AppError;
use crate::models::normalize_email;
use crate::repositories::AccountStore;
use crate::services::{CredentialService, Notifier};

/// パスワードリセットサービス
#[derive(Clone)]
pub struct PasswordResetService<S, N> {
    store: S,
    credentials: CredentialService<S>,
    notifier: N,
}

impl<S: AccountStore, N: Notifier> PasswordResetService<S, N> {
    /// 新しい PasswordResetService を作成
    pub fn new(store: S, credentials: CredentialService<S>, notifier: N) -> Self {
        Self {
            store,
            credentials,
            notifier,
        }
    }

    /// パスワードリセットをリクエスト
    ///
    /// # Security
    /// - アカウントが存在しない場合も常に成功を返す（情報漏洩防止）
    /// - トークン（平文）はログに出力しない
    pub async fn request_reset(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        tracing::info!(email = %email, "パスワードリセットリクエスト");

        let Some(mut account) = self.store.find_by_email(&email).await? else {
            tracing::info!(email = %email, "パスワードリセット: アカウント不在（成功レスポンス返却）");
            return Ok(());
        };

        let token = self.credentials.issue_reset(&mut account).await?;

        // 送信失敗でもダイジェストは残す
        if let Err(e) = self.notifier.send_password_reset(&account, &token).await {
            tracing::error!(error = ?e, account_id = %account.id, "パスワードリセットメール送信失敗");
        }

        Ok(())
    }

    /// パスワードをリセット
    ///
    /// アカウント不在はトークン不一致と同じ `TokenInvalid` を返す
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let email = normalize_email(email);
        let mut account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        self.credentials
            .reset_password(&mut account, token, new_password)
            .await
    }
}
