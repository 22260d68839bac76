//! PostgreSQL implementation of account repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::entities::{Account, AccountStatus, NewAccount};
use crate::domain::repositories::AccountRepository;
use crate::error::AppError;

/// PostgreSQL repository for user accounts.
///
/// An account row and its role assignments are written in one transaction.
pub struct PgAccountRepository {
    pool: Arc<PgPool>,
}

impl PgAccountRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn with_roles(&self, row: Option<AccountRow>) -> Result<Option<Account>, AppError> {
        let Some(row) = row else {
            return Ok(None);
        };

        let roles: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM account_roles ar
            JOIN roles r ON r.id = ar.role_id
            WHERE ar.account_id = $1
            "#,
        )
        .bind(row.id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(Some(row.into_account(roles)))
    }
}

#[derive(FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    mail: String,
    init: String,
    status: i16,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self, roles: Vec<String>) -> Account {
        Account {
            id: self.id,
            name: self.name,
            mail: self.mail,
            init: self.init,
            status: AccountStatus::from_i16(self.status),
            roles: roles.into_iter().collect::<BTreeSet<_>>(),
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn exists_by_email(&self, mail: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE mail = $1)")
                .bind(mail)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn exists_by_username(&self, name: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE name = $1)")
                .bind(name)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn create(&self, new_account: NewAccount) -> Result<Account, AppError> {
        let mut tx = self.pool.begin().await?;

        let row: AccountRow = sqlx::query_as(
            r#"
            INSERT INTO accounts (name, mail, init, password_hash, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, mail, init, status, created_at
            "#,
        )
        .bind(&new_account.name)
        .bind(&new_account.mail)
        .bind(&new_account.init)
        .bind(&new_account.password_hash)
        .bind(new_account.status.as_i16())
        .fetch_one(&mut *tx)
        .await?;

        let role_names: Vec<String> = new_account.roles.into_iter().collect();
        let granted: Vec<String> = sqlx::query_scalar(
            r#"
            WITH granted AS (
                INSERT INTO account_roles (account_id, role_id)
                SELECT $1, r.id
                FROM roles r
                WHERE r.name = ANY($2)
                RETURNING role_id
            )
            SELECT r.name
            FROM granted g
            JOIN roles r ON r.id = g.role_id
            "#,
        )
        .bind(row.id)
        .bind(&role_names)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into_account(granted))
    }

    async fn find_by_username(&self, name: &str) -> Result<Option<Account>, AppError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, name, mail, init, status, created_at
            FROM accounts
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        self.with_roles(row).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, name, mail, init, status, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        self.with_roles(row).await
    }
}
