/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    authorization_header, extract_bearer, verify_against_placeholder, verify_password, AccessTokenCodec,
    RefreshTokenStore,
};
use crate::error::{AppError, AuthError, ErrorContext};
use crate::routes::users::UserResponse;
use crate::storage::Store;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// Returns the user together with a fresh access token and refresh token.
///
/// # Errors
/// - 401: unknown email or wrong password, with one shared message and the
///   same bcrypt work on both paths so neither body nor timing reveals
///   which accounts exist
/// - 500: hashing or storage failure
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<dyn Store>,
    codec: web::Data<AccessTokenCodec>,
    refresh_tokens: web::Data<RefreshTokenStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let LoginRequest { email, password } = form.into_inner();

    let user = match store.get_user_by_email(email.trim()).await? {
        Some(user) => user,
        None => {
            web::block(move || verify_against_placeholder(&password)).await??;
            tracing::info!(request_id = %context.request_id, "Login for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let hashed_password = user.hashed_password.clone();
    let password_valid = web::block(move || verify_password(&password, &hashed_password)).await??;
    if !password_valid {
        tracing::info!(
            request_id = %context.request_id,
            user_id = %user.id,
            "Login with wrong password"
        );
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = codec.issue(user.id, codec.access_token_ttl())?;
    let refresh_token = refresh_tokens.issue(user.id).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: user.into(),
        token,
        refresh_token,
    }))
}

/// POST /api/refresh
///
/// Exchanges `Authorization: Bearer <refresh token>` for a new access token.
/// The refresh token itself is neither rotated nor extended.
///
/// # Errors
/// - 401: malformed header, or unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    codec: web::Data<AccessTokenCodec>,
    refresh_tokens: web::Data<RefreshTokenStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let refresh_token = extract_bearer(authorization_header(&req))?;
    let user_id = refresh_tokens.resolve(refresh_token).await?;
    let token = codec.issue(user_id, codec.access_token_ttl())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "Access token refreshed"
    );

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Revokes the refresh token carried in the `Authorization` header.
/// Revoking an already revoked token succeeds.
///
/// # Errors
/// - 401: malformed header or unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    refresh_tokens: web::Data<RefreshTokenStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_revoke");

    let refresh_token = extract_bearer(authorization_header(&req))?;
    refresh_tokens.revoke(refresh_token).await?;

    tracing::info!(request_id = %context.request_id, "Refresh token revoked");

    Ok(HttpResponse::NoContent().finish())
}
