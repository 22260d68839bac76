//! Business logic services for the application layer.

pub mod account_service;
pub mod auth_service;
pub mod category_service;
pub mod oauth_service;

pub use account_service::{AccountService, ImportUser};
pub use auth_service::AuthService;
pub use category_service::CategoryService;
pub use oauth_service::{OAuthService, SignedRequest};
