//! Repository trait for category data access.

use crate::domain::entities::{Category, CategoryPatch, NewCategory};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for content categories.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCategoryRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Persists a new category.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the UUID is already in use.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_category: NewCategory) -> Result<Category, AppError>;

    /// Returns every category carrying this external identifier.
    ///
    /// Callers decide how to treat zero or several matches.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Vec<Category>, AppError>;

    /// Applies a partial update. `None` fields in the patch are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no category has this id.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_fields(&self, id: i64, patch: CategoryPatch) -> Result<Category, AppError>;
}
