/// Authorization header framing
///
/// Pulls a credential out of `Authorization: <Scheme> <credential>`. No
/// decoding or validation of the credential happens here.

use actix_web::{http::header::AUTHORIZATION, HttpRequest};

use crate::error::AuthError;

const BEARER_SCHEME: &str = "Bearer";
const API_KEY_SCHEME: &str = "ApiKey";

/// Raw `Authorization` header value, `None` if absent or not valid UTF-8
pub fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Extract the token from `Bearer <token>`
///
/// # Errors
/// Returns `AuthError::MalformedHeader` unless the header is exactly two
/// whitespace-separated parts, the first being `Bearer`
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    extract_credential(header, BEARER_SCHEME)
}

/// Extract the key from `ApiKey <key>`, framed like a bearer token
pub fn extract_api_key(header: Option<&str>) -> Result<&str, AuthError> {
    extract_credential(header, API_KEY_SCHEME)
}

fn extract_credential<'a>(header: Option<&'a str>, scheme: &str) -> Result<&'a str, AuthError> {
    let header = header
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| AuthError::malformed_header("missing Authorization header"))?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(found), Some(credential), None) if found == scheme => Ok(credential),
        _ => Err(AuthError::malformed_header(format!(
            "expected '{} <credential>'",
            scheme
        ))),
    }
}
