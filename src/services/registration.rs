use garde::Validate;

use crate::error::AppError;
use crate::models::{Account, NewAccount};
use crate::repositories::{AccountStore, RepositoryError};
use crate::services::{CredentialService, Notifier};

/// アカウント登録サービス
#[derive(Clone)]
pub struct RegistrationService<S, N> {
    store: S,
    credentials: CredentialService<S>,
    notifier: N,
}

impl<S: AccountStore, N: Notifier> RegistrationService<S, N> {
    /// 新しい RegistrationService を作成
    pub fn new(store: S, credentials: CredentialService<S>, notifier: N) -> Self {
        Self {
            store,
            credentials,
            notifier,
        }
    }

    /// アカウントを登録し、有効化メールを送る
    ///
    /// 処理フロー:
    /// 1. 入力バリデーション
    /// 2. メールアドレス正規化・パスワードハッシュ化
    /// 3. 有効化ダイジェスト発行
    /// 4. 保存
    /// 5. 有効化メール送信（失敗しても登録は取り消さない）
    ///
    /// # Security
    /// - パスワード・有効化トークンはログに出力しない
    pub async fn register(&self, input: &NewAccount) -> Result<Account, AppError> {
        // 1. 入力バリデーション
        input.validate()?;

        // 2. 正規化・ハッシュ化
        let password_digest = self.credentials.hash(&input.password)?;
        let mut account = Account::new(&input.name, &input.email, password_digest);

        // 3. 有効化ダイジェスト発行
        let activation_token = self.credentials.issue_activation(&mut account)?;

        // 4. 保存
        self.store.insert(&account).await.map_err(|e| match e {
            RepositoryError::DuplicateEmail => AppError::EmailAlreadyExists,
            e => AppError::Persistence(e),
        })?;

        tracing::info!(account_id = %account.id, email = %account.email, "アカウント登録成功");

        // 5. 有効化メール送信
        if let Err(e) = self
            .notifier
            .send_activation(&account, &activation_token)
            .await
        {
            tracing::error!(error = ?e, account_id = %account.id, "有効化メール送信失敗");
        }

        Ok(account)
    }
}
