use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Account, normalize_email};
use crate::repositories::{AccountStore, RepositoryError};
use crate::services::digest::{self, HashCost};

const DUMMY_PASSWORD: &str = "socialite-dummy-password";

/// 認証サービス
#[derive(Clone)]
pub struct AuthService<S> {
    store: S,
    /// タイミング攻撃対策用のダミーダイジェスト（実ダイジェストと同じコスト）
    dummy_digest: Option<String>,
}

impl<S: AccountStore> AuthService<S> {
    /// 新しい AuthService を作成
    ///
    /// ダミーダイジェストを `hash_cost` で一度だけ生成する
    pub fn new(store: S, hash_cost: &HashCost) -> Self {
        let dummy_digest = digest::hash(DUMMY_PASSWORD, hash_cost)
            .inspect_err(|e| tracing::error!(error = ?e, "ダミーダイジェスト生成失敗"))
            .ok();
        Self {
            store,
            dummy_digest,
        }
    }

    /// メールアドレスとパスワードで認証
    ///
    /// アカウント不在・パスワード不一致は区別せず `Authentication` を返す。
    /// パスワードが一致しても未有効化なら `AccountNotActivated`。
    ///
    /// タイミング攻撃対策: アカウントが存在しない場合もダミーのパスワード検証を実行
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let email = normalize_email(email);
        let account = self.store.find_by_email(&email).await?;

        let Some(account) = account else {
            let _ = digest::verify(password, self.dummy_digest.as_deref());
            tracing::warn!(email = %email, "認証失敗: アカウント不在");
            return Err(AppError::Authentication("invalid_credentials".to_string()));
        };

        if !digest::verify(password, Some(&account.password_digest)) {
            tracing::warn!(email = %email, "認証失敗: パスワード不一致");
            return Err(AppError::Authentication("invalid_credentials".to_string()));
        }

        if !account.activated {
            tracing::warn!(account_id = %account.id, "認証失敗: 未有効化アカウント");
            return Err(AppError::AccountNotActivated);
        }

        tracing::info!(account_id = %account.id, "認証成功");
        Ok(account)
    }

    /// remember トークンで認証（永続 Cookie からの復帰）
    pub async fn login_with_remember(&self, id: Uuid, token: &str) -> Result<Account, AppError> {
        let account = match self.store.load(id).await {
            Ok(account) => account,
            Err(RepositoryError::NotFound(_)) => {
                tracing::warn!(account_id = %id, "remember 認証失敗: アカウント不在");
                return Err(AppError::Authentication("invalid_remember_token".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if !digest::verify(token, account.remember_digest.as_deref()) {
            tracing::warn!(account_id = %id, "remember 認証失敗: トークン不一致");
            return Err(AppError::Authentication("invalid_remember_token".to_string()));
        }

        if !account.activated {
            return Err(AppError::AccountNotActivated);
        }

        tracing::info!(account_id = %id, "remember 認証成功");
        Ok(account)
    }
}
