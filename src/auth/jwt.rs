/// JWT Token Generation and Validation
///
/// The codec is built once from `JwtSettings` and shared read-only across
/// workers. Validation is local and all-or-nothing: any failure yields
/// `AuthError::Unauthorized` with a reason meant for the logs.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// The only algorithm this service signs with or accepts.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_token_ttl: Duration,
    validation: Validation,
}

impl AccessTokenCodec {
    pub fn new(config: &JwtSettings) -> Self {
        let secret = config.secret.expose().as_bytes();

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.leeway;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            access_token_ttl: Duration::seconds(config.access_token_expiry),
            validation,
        }
    }

    /// Lifetime used for tokens handed out at login and refresh
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Generate a signed access token for `user_id` expiring after `ttl`
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let claims = Claims::new(user_id, &self.issuer, ttl);

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Validate an access token and return its subject
    ///
    /// Checks, in order: declared algorithm, signature, issuer, `nbf`,
    /// presence and strict future-ness of `exp`, and that `sub` is a UUID.
    ///
    /// # Errors
    /// Returns `AuthError::Unauthorized` on any failure
    pub fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::unauthorized(format!("unreadable token header: {}", e)))?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(AuthError::unauthorized(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::unauthorized(format!("token rejected: {}", e)))?;

        // the library applies leeway to exp; expiry itself is strict
        if claims.is_expired_at(Utc::now().timestamp()) {
            return Err(AuthError::unauthorized("token has expired"));
        }

        claims.user_id()
    }
}
