use std::future::Future;

use uuid::Uuid;

use crate::models::Account;

pub mod account;
pub mod memory;

pub use account::AccountRepository;
pub use memory::MemoryAccountStore;

/// 永続化層のエラー
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("データベースエラー")]
    Database(#[from] sqlx::Error),

    #[error("アカウントが見つかりません: {0}")]
    NotFound(Uuid),

    #[error("メールアドレスが重複しています")]
    DuplicateEmail,

    #[error("ストレージが利用できません: {0}")]
    Unavailable(String),
}

/// アカウントの永続化
///
/// `save` はアカウント1件の全カラムを一括で書き込む。
/// 途中までの更新が見えることはない。
pub trait AccountStore: Clone + Send + Sync + 'static {
    fn load(&self, id: Uuid) -> impl Future<Output = Result<Account, RepositoryError>> + Send;

    /// 正規化済みのメールアドレスで検索
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Account>, RepositoryError>> + Send;

    fn insert(&self, account: &Account) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn save(&self, account: &Account) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
