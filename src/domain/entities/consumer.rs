//! OAuth consumer entity.

use chrono::{DateTime, Utc};

/// An application allowed to sign requests with 2-legged OAuth.
///
/// `context` scopes the consumer to one API; a consumer registered for another
/// context is rejected even with a valid signature.
#[derive(Debug, Clone)]
pub struct Consumer {
    pub id: i64,
    pub name: String,
    pub consumer_key: String,
    pub secret: String,
    pub context: String,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Consumer {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Input data for registering a consumer.
#[derive(Debug, Clone)]
pub struct NewConsumer {
    pub name: String,
    pub consumer_key: String,
    pub secret: String,
    pub context: String,
}
