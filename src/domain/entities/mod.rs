//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`Account`] - An imported user account
//! - [`Role`] - A named role from the role registry
//! - [`Category`] - A content category addressable by UUID
//! - [`Consumer`] - An OAuth consumer allowed to call the API
//! - [`Session`] - A bearer session owned by an account
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! - `NewAccount`, `NewCategory`, `NewConsumer`, `NewSession` - For creating new records
//! - `CategoryPatch` - For partial updates

pub mod account;
pub mod category;
pub mod consumer;
pub mod role;
pub mod session;

pub use account::{Account, AccountStatus, NewAccount};
pub use category::{Category, CategoryFields, CategoryPatch, NewCategory};
pub use consumer::{Consumer, NewConsumer};
pub use role::{ANONYMOUS_ROLE, AUTHENTICATED_ROLE, Role};
pub use session::{NewSession, Session};
