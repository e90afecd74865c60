/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 bytes from the OS CSPRNG, hex encoded (64 characters)
/// - Opaque: no structure, only meaningful as a storage key
/// - Valid for a fixed lifetime unless revoked
/// - Reusable: resolving a token does not rotate or consume it
///
/// Expiry is derived at lookup; nothing sweeps old rows.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;

use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::storage::{RefreshTokenRecord, Store};

const TOKEN_BYTES: usize = 32;

/// Generate a new cryptographically secure refresh token
///
/// Collisions are not checked for; at 256 bits they are negligible.
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Internal(format!("Entropy source failure: {}", e)))?;
    Ok(hex::encode(bytes))
}

pub struct RefreshTokenStore {
    store: Arc<dyn Store>,
    lifetime: Duration,
}

impl RefreshTokenStore {
    pub fn new(store: Arc<dyn Store>, config: &JwtSettings) -> Self {
        Self {
            store,
            lifetime: Duration::days(config.refresh_token_expiry_days),
        }
    }

    /// Issue and persist a refresh token for `user_id`
    ///
    /// # Errors
    /// Returns error if randomness or the storage write fails
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let token = generate_refresh_token()?;
        let now = Utc::now();

        let record = RefreshTokenRecord {
            token: token.clone(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + self.lifetime,
            revoked_at: None,
        };
        self.store.create_refresh_token(&record).await?;

        tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token issued");
        Ok(token)
    }

    /// Resolve a refresh token to its owner
    ///
    /// Unknown, revoked and expired tokens all fail with
    /// `AuthError::InvalidRefreshToken`; only the log line tells them apart.
    pub async fn resolve(&self, token: &str) -> Result<Uuid, AppError> {
        let record = match self.store.get_refresh_token(token).await? {
            Some(record) => record,
            None => {
                tracing::warn!("Refresh token not found");
                return Err(AuthError::InvalidRefreshToken.into());
            }
        };

        if record.is_revoked() {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            return Err(AuthError::InvalidRefreshToken.into());
        }

        if record.is_expired_at(Utc::now()) {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(AuthError::InvalidRefreshToken.into());
        }

        Ok(record.user_id)
    }

    /// Revoke a refresh token
    ///
    /// Revoking an already revoked token succeeds without touching it.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidRefreshToken` if the token was never issued
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let record = self
            .store
            .get_refresh_token(token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if record.is_revoked() {
            tracing::debug!(user_id = %record.user_id, "Refresh token already revoked");
            return Ok(());
        }

        self.store.revoke_refresh_token(token, Utc::now()).await?;
        tracing::info!(user_id = %record.user_id, "Refresh token revoked");
        Ok(())
    }
}
