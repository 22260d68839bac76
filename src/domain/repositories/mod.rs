//! Repository trait definitions for the domain layer.
//!
//! These traits are the capability interfaces handlers depend on. Concrete
//! implementations live in `crate::infrastructure::persistence`; mock
//! implementations are auto-generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`AccountRepository`] - Account lookups and creation
//! - [`RoleRepository`] - Role registry lookups
//! - [`CategoryRepository`] - Category lookup by UUID, creation and partial updates
//! - [`ConsumerRepository`] - OAuth consumers and nonce bookkeeping
//! - [`SessionRepository`] - Bearer sessions owned by accounts
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod account_repository;
pub mod category_repository;
pub mod consumer_repository;
pub mod role_repository;
pub mod session_repository;

pub use account_repository::AccountRepository;
pub use category_repository::CategoryRepository;
pub use consumer_repository::ConsumerRepository;
pub use role_repository::RoleRepository;
pub use session_repository::SessionRepository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
#[cfg(test)]
pub use consumer_repository::MockConsumerRepository;
#[cfg(test)]
pub use role_repository::MockRoleRepository;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
