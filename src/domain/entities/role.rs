//! Role entity from the role registry.

use chrono::{DateTime, Utc};

/// Role every imported account receives.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

/// Role of unauthenticated visitors; never granted to an account.
pub const ANONYMOUS_ROLE: &str = "anonymous";

/// A named role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn new(id: i64, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }

    /// Returns true if the role may be granted to an imported account.
    pub fn is_grantable(&self) -> bool {
        self.name != ANONYMOUS_ROLE
    }
}
