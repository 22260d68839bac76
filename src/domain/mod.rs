//! Accounts, categories, OAuth consumers and sessions, plus the storage
//! traits the services are written against.
//!
//! Nothing here knows about HTTP or PostgreSQL.

pub mod entities;
pub mod repositories;
