//! Session entity: a bearer credential owned by an account.

use chrono::{DateTime, Utc};

/// A bearer session issued to an account.
///
/// Only the HMAC-SHA256 of the raw token is kept. A session stops
/// authenticating once revoked or once its account is blocked.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub account_id: i64,
    pub label: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Input data for issuing a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub account_id: i64,
    pub label: String,
    pub token_hash: String,
}
