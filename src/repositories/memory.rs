use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, RepositoryError};
use crate::models::Account;

/// メモリ上のアカウントストア（テスト・ローカル実行用）
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の操作をすべて `RepositoryError::Unavailable` で失敗させる
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

impl AccountStore for MemoryAccountStore {
    async fn load(&self, id: Uuid) -> Result<Account, RepositoryError> {
        self.check_available()?;
        self.accounts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        self.check_available()?;
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn insert(&self, account: &Account) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(RepositoryError::DuplicateEmail);
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn save(&self, account: &Account) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(RepositoryError::DuplicateEmail);
        }
        let stored = accounts
            .get_mut(&account.id)
            .ok_or(RepositoryError::NotFound(account.id))?;
        *stored = account.clone();
        Ok(())
    }
}
