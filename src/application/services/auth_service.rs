//! Bearer session authentication.
//!
//! A request carrying `Authorization: Bearer <token>` comes from a signed-in
//! account and skips OAuth signing. The token resolves to a [`Session`], and
//! the session to the [`Account`] that owns it.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::{Account, AccountStatus, Session};
use crate::domain::repositories::{AccountRepository, SessionRepository};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Digests a raw session token with HMAC-SHA256 keyed by the server secret.
///
/// The admin CLI digests freshly issued tokens with the same function.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Resolves bearer tokens to the accounts that own them.
pub struct AuthService {
    sessions: Arc<dyn SessionRepository>,
    accounts: Arc<dyn AccountRepository>,
    signing_secret: String,
}

impl AuthService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        accounts: Arc<dyn AccountRepository>,
        signing_secret: String,
    ) -> Self {
        Self {
            sessions,
            accounts,
            signing_secret,
        }
    }

    /// Returns the account behind a raw bearer token.
    ///
    /// The session must be unrevoked and its account active. A successful
    /// lookup stamps the session's `last_used_at`; failing to do so is logged
    /// and does not reject the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown or revoked token and
    /// for a session whose account is missing or blocked.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<Account, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let Some(session) = self.sessions.find_active(&token_hash).await? else {
            return Err(rejected("Invalid or revoked token"));
        };

        let account = self.owner(&session).await?;

        if let Err(e) = self.sessions.touch(session.id).await {
            tracing::warn!(session_id = session.id, error = %e, "Failed to stamp session use");
        }

        tracing::debug!(account = %account.name, session_id = session.id, "Session verified");
        Ok(account)
    }

    async fn owner(&self, session: &Session) -> Result<Account, AppError> {
        match self.accounts.find_by_id(session.account_id).await? {
            Some(account) if account.status == AccountStatus::Active => Ok(account),
            Some(_) => Err(rejected("Account is blocked")),
            None => Err(rejected("Session has no account")),
        }
    }
}

fn rejected(reason: &str) -> AppError {
    metrics::counter!("import_auth_failures_total", "scheme" => "bearer").increment(1);
    AppError::unauthorized("Unauthorized", json!({ "reason": reason }))
}
