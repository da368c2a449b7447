use garde::Validate;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::models::{Account, AccountUpdate, normalize_email};
use crate::repositories::{AccountStore, RepositoryError};
use crate::services::CredentialService;

/// プロフィール更新サービス
#[derive(Clone)]
pub struct AccountService<S> {
    store: S,
    credentials: CredentialService<S>,
}

impl<S: AccountStore> AccountService<S> {
    /// 新しい AccountService を作成
    pub fn new(store: S, credentials: CredentialService<S>) -> Self {
        Self { store, credentials }
    }

    /// 名前・メールアドレス・パスワードを更新
    ///
    /// パスワード未指定なら既存のダイジェストを維持する。
    /// 保存に失敗した場合、呼び出し元のアカウントは変更されない。
    ///
    /// # Errors
    /// - 入力不正: `Validation`
    /// - メールアドレスが他アカウントと重複: `EmailAlreadyExists`
    ///
    /// # Security
    /// - パスワードはログに出力しない
    pub async fn update_account(
        &self,
        account: &mut Account,
        input: &AccountUpdate,
    ) -> Result<(), AppError> {
        input.validate()?;

        let mut updated = account.clone();
        updated.name = input.name.trim().to_string();
        updated.email = normalize_email(&input.email);
        if let Some(password) = &input.password {
            updated.password_digest = self.credentials.hash(password)?;
        }
        updated.updated_at = OffsetDateTime::now_utc();

        self.store.save(&updated).await.map_err(|e| match e {
            RepositoryError::DuplicateEmail => AppError::EmailAlreadyExists,
            e => AppError::Persistence(e),
        })?;
        *account = updated;

        tracing::info!(
            account_id = %account.id,
            password_changed = input.password.is_some(),
            "プロフィール更新完了"
        );
        Ok(())
    }
}
