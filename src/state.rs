//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{AccountService, AuthService, CategoryService, OAuthService};

/// Services shared by every request.
///
/// Cloning is cheap: each service sits behind an [`Arc`].
#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub category_service: Arc<CategoryService>,
    pub auth_service: Arc<AuthService>,
    pub oauth_service: Arc<OAuthService>,
}

impl AppState {
    pub fn new(
        account_service: Arc<AccountService>,
        category_service: Arc<CategoryService>,
        auth_service: Arc<AuthService>,
        oauth_service: Arc<OAuthService>,
    ) -> Self {
        Self {
            account_service,
            category_service,
            auth_service,
            oauth_service,
        }
    }
}
