use sqlx::PgPool;
use uuid::Uuid;

use super::{AccountStore, RepositoryError};
use crate::models::Account;

const ACCOUNT_COLUMNS: &str = "id, name, email, password_digest, remember_digest, \
     activation_digest, activated, activated_at, reset_digest, reset_sent_at, \
     admin, created_at, updated_at";

const EMAIL_UNIQUE_CONSTRAINT: &str = "accounts_email_key";

/// PostgreSQL 上のアカウントリポジトリ
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountStore for AccountRepository {
    async fn load(&self, id: Uuid) -> Result<Account, RepositoryError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    /// 新しいアカウントを作成
    ///
    /// # Errors
    /// - UNIQUE制約違反時: `RepositoryError::DuplicateEmail`
    async fn insert(&self, account: &Account) -> Result<(), RepositoryError> {
        let sql = format!(
            "INSERT INTO accounts ({ACCOUNT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        );
        sqlx::query(&sql)
            .bind(account.id)
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.password_digest)
            .bind(&account.remember_digest)
            .bind(&account.activation_digest)
            .bind(account.activated)
            .bind(account.activated_at)
            .bind(&account.reset_digest)
            .bind(account.reset_sent_at)
            .bind(account.admin)
            .bind(account.created_at)
            .bind(account.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(())
    }

    /// アカウントを更新
    ///
    /// `updated_at` は呼び出し側で設定した値をそのまま書き込む
    ///
    /// # Errors
    /// - メールアドレスの UNIQUE制約違反時: `RepositoryError::DuplicateEmail`
    async fn save(&self, account: &Account) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET name = $2,
                email = $3,
                password_digest = $4,
                remember_digest = $5,
                activation_digest = $6,
                activated = $7,
                activated_at = $8,
                reset_digest = $9,
                reset_sent_at = $10,
                admin = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_digest)
        .bind(&account.remember_digest)
        .bind(&account.activation_digest)
        .bind(account.activated)
        .bind(account.activated_at)
        .bind(&account.reset_digest)
        .bind(account.reset_sent_at)
        .bind(account.admin)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(account.id));
        }

        Ok(())
    }
}

fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
    {
        return RepositoryError::DuplicateEmail;
    }
    RepositoryError::Database(e)
}
