/// JWT Claims structure
///
/// Registered claims (RFC 7519) carried by an access token. Every field is
/// required: a token missing any of them fails to deserialize instead of
/// falling back to a zero value.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id` valid from now until now + `ttl`
    pub fn new(user_id: Uuid, issuer: &str, ttl: Duration) -> Self {
        Self::issued_at(user_id, issuer, ttl, Utc::now())
    }

    pub fn issued_at(user_id: Uuid, issuer: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        let now = now.timestamp();
        Self {
            iss: issuer.to_string(),
            sub: user_id.to_string(),
            iat: now,
            nbf: now,
            exp: now + ttl.num_seconds(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `AuthError::Unauthorized` if the subject is empty or not a UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        if self.sub.is_empty() {
            return Err(AuthError::unauthorized("missing sub claim"));
        }
        Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::unauthorized("invalid user ID in token"))
    }

    /// Expired once `exp` is reached, with no leeway.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}
