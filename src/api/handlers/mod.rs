//! Endpoint handlers.

pub mod fallback;
pub mod health;
pub mod import_category;
pub mod import_user;

pub use fallback::{method_not_allowed_handler, not_found_handler};
pub use health::health_handler;
pub use import_category::{
    create_category_handler, missing_identifier_handler, update_category_handler,
};
pub use import_user::import_user_handler;
