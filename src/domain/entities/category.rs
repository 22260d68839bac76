//! Category entity representing an imported content category.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A content category.
///
/// `uuid` is the external identifier clients use to address the record; `id`
/// is internal.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub uuid: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub summary: Option<String>,
    pub weight: i32,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cleaned category fields taken from an import payload.
///
/// `None` means the field was absent or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFields {
    pub title: Option<String>,
    pub body: Option<String>,
    pub summary: Option<String>,
    pub weight: Option<i32>,
    pub published: Option<bool>,
}

/// Input data for creating a new category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub uuid: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub summary: Option<String>,
    pub weight: i32,
    pub published: bool,
}

impl NewCategory {
    /// Builds a new category with a fresh UUID.
    ///
    /// Returns `None` when the title is missing.
    pub fn from_fields(fields: CategoryFields) -> Option<Self> {
        Some(Self {
            uuid: Uuid::new_v4(),
            title: fields.title?,
            body: fields.body,
            summary: fields.summary,
            weight: fields.weight.unwrap_or(0),
            published: fields.published.unwrap_or(true),
        })
    }
}

/// Partial update for an existing category.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub summary: Option<String>,
    pub weight: Option<i32>,
    pub published: Option<bool>,
}

impl CategoryPatch {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == CategoryPatch::default()
    }
}

impl From<CategoryFields> for CategoryPatch {
    fn from(fields: CategoryFields) -> Self {
        Self {
            title: fields.title,
            body: fields.body,
            summary: fields.summary,
            weight: fields.weight,
            published: fields.published,
        }
    }
}
