//! Layers wrapped around the import routes.
//!
//! - [`auth`] - session bearer or 2-legged OAuth caller authentication
//! - [`rate_limit`] - per-client throttling
//! - [`tracing`] - request spans

pub mod auth;
pub mod rate_limit;
pub mod tracing;
