//! HTTP surface of the import service.
//!
//! Handlers accept JSON, form-encoded or query input through [`extract`] and
//! answer with the [`dto::envelope::ApiResponse`] envelope.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
