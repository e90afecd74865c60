/// Polka payment webhooks
///
/// Authenticated with `Authorization: ApiKey <key>` rather than a user token.
/// The key is checked before the body is parsed, so an unauthenticated
/// caller only ever sees 401.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::auth::{authorization_header, extract_api_key};
use crate::configuration::PolkaSettings;
use crate::error::{AppError, AuthError, ValidationError};
use crate::storage::Store;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

/// Compare the presented key with the configured one in constant time
///
/// An empty configured key matches nothing.
fn api_key_matches(presented: &str, configured: &str) -> bool {
    !configured.is_empty() && bool::from(presented.as_bytes().ct_eq(configured.as_bytes()))
}

/// POST /api/polka/webhooks
///
/// Always answers 204 once the key checks out: unknown events and unknown
/// users are acknowledged so Polka stops retrying.
///
/// # Errors
/// - 401: missing, malformed or wrong API key
/// - 400: body is not a webhook payload
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    store: web::Data<dyn Store>,
    polka: web::Data<PolkaSettings>,
) -> Result<HttpResponse, AppError> {
    let api_key = extract_api_key(authorization_header(&req))?;
    if !api_key_matches(api_key, polka.api_key.expose()) {
        return Err(AuthError::unauthorized("Polka API key mismatch").into());
    }

    let payload: WebhookRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Unreadable Polka payload");
        ValidationError::InvalidFormat("webhook body".to_string())
    })?;

    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring Polka event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = payload.data.user_id;
    if store.upgrade_to_chirpy_red(user_id).await? {
        tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");
    } else {
        tracing::warn!(user_id = %user_id, "Polka upgrade for unknown user");
    }

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_comparison() {
        assert!(api_key_matches("f271c81f", "f271c81f"));
        assert!(!api_key_matches("f271c81e", "f271c81f"));
        assert!(!api_key_matches("f271c81", "f271c81f"));
        assert!(!api_key_matches("", ""));
        assert!(!api_key_matches("anything", ""));
    }
}
