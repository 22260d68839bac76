//! PostgreSQL implementation of role repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::Role;
use crate::domain::repositories::RoleRepository;
use crate::error::AppError;

/// PostgreSQL repository for the role registry.
pub struct PgRoleRepository {
    pool: Arc<PgPool>,
}

impl PgRoleRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role::new(row.id, row.name, row.created_at)
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let row: Option<RoleRow> =
            sqlx::query_as("SELECT id, name, created_at FROM roles WHERE name = $1")
                .bind(name)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Role>, AppError> {
        let rows: Vec<RoleRow> = sqlx::query_as("SELECT id, name, created_at FROM roles ORDER BY id")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, name: &str) -> Result<Role, AppError> {
        let row: RoleRow = sqlx::query_as(
            r#"
            INSERT INTO roles (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }
}
