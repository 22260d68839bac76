//! DTO for the user import endpoint.

use serde::Deserialize;

use crate::application::services::account_service::ImportUser;

/// Request body for `POST /api/v1/import-new-user`.
///
/// Every field is optional at the wire level so that a missing field is
/// reported as `Please provide all field values` instead of a decoding error.
///
/// ```json
/// {"username": "dave", "email": "dave@example.com", "password": "mypass", "role": "editor"}
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ImportUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl From<ImportUserRequest> for ImportUser {
    fn from(request: ImportUserRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            password: request.password,
            role: request.role,
        }
    }
}
