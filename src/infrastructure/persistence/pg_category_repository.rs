//! PostgreSQL implementation of category repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Category, CategoryPatch, NewCategory};
use crate::domain::repositories::CategoryRepository;
use crate::error::AppError;

/// PostgreSQL repository for content categories.
pub struct PgCategoryRepository {
    pool: Arc<PgPool>,
}

impl PgCategoryRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: i64,
    uuid: Uuid,
    title: String,
    body: Option<String>,
    summary: Option<String>,
    weight: i32,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            uuid: row.uuid,
            title: row.title,
            body: row.body,
            summary: row.summary,
            weight: row.weight,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, new_category: NewCategory) -> Result<Category, AppError> {
        let row: CategoryRow = sqlx::query_as(
            r#"
            INSERT INTO categories (uuid, title, body, summary, weight, published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, uuid, title, body, summary, weight, published, created_at, updated_at
            "#,
        )
        .bind(new_category.uuid)
        .bind(&new_category.title)
        .bind(&new_category.body)
        .bind(&new_category.summary)
        .bind(new_category.weight)
        .bind(new_category.published)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Vec<Category>, AppError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, uuid, title, body, summary, weight, published, created_at, updated_at
            FROM categories
            WHERE uuid = $1
            ORDER BY id
            "#,
        )
        .bind(uuid)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_fields(&self, id: i64, patch: CategoryPatch) -> Result<Category, AppError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r#"
            UPDATE categories
            SET title      = COALESCE($2, title),
                body       = COALESCE($3, body),
                summary    = COALESCE($4, summary),
                weight     = COALESCE($5, weight),
                published  = COALESCE($6, published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, uuid, title, body, summary, weight, published, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.body)
        .bind(&patch.summary)
        .bind(patch.weight)
        .bind(patch.published)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("Category not found", json!({ "id": id })))
    }
}
