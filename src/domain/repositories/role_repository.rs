//! Repository trait for the role registry.

use crate::domain::entities::Role;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for roles.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRoleRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds a role by its exact name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError>;

    /// Lists all registered roles ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self) -> Result<Vec<Role>, AppError>;

    /// Registers a new role.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the role already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, name: &str) -> Result<Role, AppError>;
}
