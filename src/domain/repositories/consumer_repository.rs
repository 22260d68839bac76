//! Repository trait for OAuth consumers and nonces.

use crate::domain::entities::{Consumer, NewConsumer};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for OAuth consumer credentials.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgConsumerRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsumerRepository: Send + Sync {
    /// Finds a non-revoked consumer by its key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_key(&self, consumer_key: &str) -> Result<Option<Consumer>, AppError>;

    /// Records a nonce for a consumer.
    ///
    /// Returns `Ok(false)` if the consumer already used this nonce.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_nonce(
        &self,
        consumer_key: &str,
        nonce: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Registers a consumer.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the consumer key already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_consumer: NewConsumer) -> Result<Consumer, AppError>;

    /// Lists all consumers, including revoked ones.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self) -> Result<Vec<Consumer>, AppError>;

    /// Revokes a consumer so its key no longer resolves.
    ///
    /// Returns `Ok(false)` if no active consumer has this id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn revoke(&self, id: i64) -> Result<bool, AppError>;
}
