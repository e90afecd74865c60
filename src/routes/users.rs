/// User Routes
///
/// Account creation and self-service profile updates.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{hash_password, AuthenticatedUser};
use crate::error::{AppError, ErrorContext};
use crate::storage::{Store, User};
use crate::validators::{is_valid_email, validate_password};

#[derive(Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; the password hash never leaves the server
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// Validate the request and hash the password off the async executor
async fn validated_credentials(form: UserRequest) -> Result<(String, String), AppError> {
    let email = is_valid_email(&form.email)?;
    validate_password(&form.password)?;

    let password = form.password;
    let hashed_password = web::block(move || hash_password(&password)).await??;
    Ok((email, hashed_password))
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<UserRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let (email, hashed_password) = validated_credentials(form.into_inner()).await?;
    let user = store.create_user(&email, &hashed_password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Replaces the caller's email and password.
///
/// # Errors
/// - 401: missing or invalid access token
/// - 400: invalid email or password
/// - 409: email taken by another account
pub async fn update_user(
    caller: AuthenticatedUser,
    form: web::Json<UserRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(caller.user_id);

    let (email, hashed_password) = validated_credentials(form.into_inner()).await?;
    let user = store
        .update_user(caller.user_id, &email, &hashed_password)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        "User updated successfully"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
