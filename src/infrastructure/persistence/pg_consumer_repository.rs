//! PostgreSQL implementation of consumer repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Consumer, NewConsumer};
use crate::domain::repositories::ConsumerRepository;
use crate::error::AppError;

/// PostgreSQL repository for OAuth consumers.
///
/// Used nonces are kept in `oauth_nonces`; the primary key on
/// `(consumer_key, nonce)` makes replay detection atomic.
pub struct PgConsumerRepository {
    pool: Arc<PgPool>,
}

impl PgConsumerRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ConsumerRow {
    id: i64,
    name: String,
    consumer_key: String,
    secret: String,
    context: String,
    created_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<ConsumerRow> for Consumer {
    fn from(row: ConsumerRow) -> Self {
        Consumer {
            id: row.id,
            name: row.name,
            consumer_key: row.consumer_key,
            secret: row.secret,
            context: row.context,
            created_at: row.created_at,
            revoked_at: row.revoked_at,
        }
    }
}

#[async_trait]
impl ConsumerRepository for PgConsumerRepository {
    async fn find_by_key(&self, consumer_key: &str) -> Result<Option<Consumer>, AppError> {
        let row: Option<ConsumerRow> = sqlx::query_as(
            r#"
            SELECT id, name, consumer_key, secret, context, created_at, revoked_at
            FROM oauth_consumers
            WHERE consumer_key = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(consumer_key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn record_nonce(
        &self,
        consumer_key: &str,
        nonce: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO oauth_nonces (consumer_key, nonce, timestamp)
            VALUES ($1, $2, $3)
            ON CONFLICT (consumer_key, nonce) DO NOTHING
            "#,
        )
        .bind(consumer_key)
        .bind(nonce)
        .bind(timestamp)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn create(&self, new_consumer: NewConsumer) -> Result<Consumer, AppError> {
        let row: ConsumerRow = sqlx::query_as(
            r#"
            INSERT INTO oauth_consumers (name, consumer_key, secret, context)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, consumer_key, secret, context, created_at, revoked_at
            "#,
        )
        .bind(&new_consumer.name)
        .bind(&new_consumer.consumer_key)
        .bind(&new_consumer.secret)
        .bind(&new_consumer.context)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Consumer>, AppError> {
        let rows: Vec<ConsumerRow> = sqlx::query_as(
            r#"
            SELECT id, name, consumer_key, secret, context, created_at, revoked_at
            FROM oauth_consumers
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn revoke(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE oauth_consumers
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
