/// Chirp Routes
///
/// Reading is public; posting and deleting require an access token, and
/// deleting additionally requires owning the chirp.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthenticatedUser, AuthorizationGuard};
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::storage::Store;
use crate::validators::{clean_chirp_body, validate_chirp_body};

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat("chirp id".to_string()).into())
}

/// POST /api/chirps
///
/// # Errors
/// - 401: missing or invalid access token
/// - 400: empty body or longer than 140 characters
pub async fn create_chirp(
    caller: AuthenticatedUser,
    form: web::Json<ChirpRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_create").with_user_id(caller.user_id);

    validate_chirp_body(&form.body)?;
    let body = clean_chirp_body(&form.body);

    let chirp = store.create_chirp(caller.user_id, &body).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %caller.user_id,
        chirp_id = %chirp.id,
        "Chirp created"
    );

    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps
pub async fn list_chirps(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let chirps = store.list_chirps().await?;
    tracing::debug!(count = chirps.len(), "Chirps listed");
    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: missing or invalid access token
/// - 404: no such chirp
/// - 403: the caller is not the chirp's author
pub async fn delete_chirp(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_delete").with_user_id(caller.user_id);
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp".to_string()))?;

    AuthorizationGuard::check_owner(caller.user_id, chirp.user_id)?;

    store.delete_chirp(chirp.id).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %caller.user_id,
        chirp_id = %chirp.id,
        "Chirp deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
