//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row types.
//!
//! # Repositories
//!
//! - [`PgAccountRepository`] - Accounts and their role assignments
//! - [`PgRoleRepository`] - Role registry
//! - [`PgCategoryRepository`] - Category storage and partial updates
//! - [`PgConsumerRepository`] - OAuth consumers and used nonces
//! - [`PgSessionRepository`] - Account sessions

pub mod pg_account_repository;
pub mod pg_category_repository;
pub mod pg_consumer_repository;
pub mod pg_role_repository;
pub mod pg_session_repository;

pub use pg_account_repository::PgAccountRepository;
pub use pg_category_repository::PgCategoryRepository;
pub use pg_consumer_repository::PgConsumerRepository;
pub use pg_role_repository::PgRoleRepository;
pub use pg_session_repository::PgSessionRepository;
