/// Authorization Guard
///
/// Two tiers, kept distinct on purpose: a caller without a valid access
/// token gets `Unauthorized`, a caller authenticated as someone other than
/// the resource owner gets `Forbidden`.

use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::auth::bearer::{authorization_header, extract_bearer};
use crate::auth::jwt::AccessTokenCodec;
use crate::error::{AppError, AuthError};

pub struct AuthorizationGuard {
    codec: Arc<AccessTokenCodec>,
}

impl AuthorizationGuard {
    pub fn new(codec: Arc<AccessTokenCodec>) -> Self {
        Self { codec }
    }

    /// Identify the caller from an `Authorization` header value
    ///
    /// # Errors
    /// Returns `AuthError::Unauthorized` if the header is malformed or the
    /// access token does not validate
    pub fn authenticate(&self, header: Option<&str>) -> Result<Uuid, AuthError> {
        let token = extract_bearer(header).map_err(|e| AuthError::unauthorized(e.to_string()))?;
        self.codec.validate(token)
    }

    /// Allow the caller only if they own the resource
    ///
    /// Returns the caller's id on success.
    ///
    /// # Errors
    /// - `AuthError::Unauthorized` if the caller cannot be authenticated
    /// - `AuthError::Forbidden` if the caller is not `resource_owner`
    pub fn require_owner(&self, header: Option<&str>, resource_owner: Uuid) -> Result<Uuid, AuthError> {
        let subject = self.authenticate(header)?;
        Self::check_owner(subject, resource_owner)?;
        Ok(subject)
    }

    /// Ownership half of `require_owner`, for callers that already
    /// authenticated (e.g. through `AuthenticatedUser`)
    pub fn check_owner(subject: Uuid, resource_owner: Uuid) -> Result<(), AuthError> {
        if subject != resource_owner {
            tracing::warn!(
                user_id = %subject,
                owner_id = %resource_owner,
                "Caller does not own the resource"
            );
            return Err(AuthError::Forbidden);
        }
        Ok(())
    }
}

/// Extractor for handlers that need an authenticated caller
///
/// Resolves through the `AuthorizationGuard` registered as app data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AuthorizationGuard>>() {
            Some(guard) => guard
                .authenticate(authorization_header(req))
                .map(|user_id| AuthenticatedUser { user_id })
                .map_err(AppError::from),
            None => Err(AppError::Internal(
                "AuthorizationGuard is not registered".to_string(),
            )),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{JwtSettings, SecretString};
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test::TestRequest;
    use chrono::Duration;

    fn codec() -> Arc<AccessTokenCodec> {
        Arc::new(AccessTokenCodec::new(&JwtSettings {
            secret: SecretString::new("guard-test-secret"),
            issuer: "chirpy".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry_days: 60,
            leeway: 5,
        }))
    }

    #[test]
    fn test_owner_is_allowed() {
        let codec = codec();
        let guard = AuthorizationGuard::new(codec.clone());
        let owner = Uuid::new_v4();
        let header = format!("Bearer {}", codec.issue(owner, Duration::hours(1)).unwrap());

        assert_eq!(guard.require_owner(Some(&header), owner).unwrap(), owner);
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let codec = codec();
        let guard = AuthorizationGuard::new(codec.clone());
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let header = format!("Bearer {}", codec.issue(user_a, Duration::hours(1)).unwrap());

        assert_eq!(guard.require_owner(Some(&header), user_b), Err(AuthError::Forbidden));
    }

    #[test]
    fn test_check_owner() {
        let owner = Uuid::new_v4();
        assert!(AuthorizationGuard::check_owner(owner, owner).is_ok());
        assert_eq!(
            AuthorizationGuard::check_owner(Uuid::new_v4(), owner),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        let guard = AuthorizationGuard::new(codec());

        let result = guard.require_owner(None, Uuid::new_v4());
        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[test]
    fn test_malformed_header_is_unauthorized() {
        let guard = AuthorizationGuard::new(codec());

        let result = guard.require_owner(Some("Token abc"), Uuid::new_v4());
        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[test]
    fn test_invalid_token_is_unauthorized_even_for_owner_id() {
        let guard = AuthorizationGuard::new(codec());
        let owner = Uuid::new_v4();

        let result = guard.require_owner(Some("Bearer not.a.jwt"), owner);
        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn test_extractor_uses_registered_guard() {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let token = codec.issue(user_id, Duration::hours(1)).unwrap();

        let (req, mut payload) = TestRequest::default()
            .app_data(web::Data::new(AuthorizationGuard::new(codec)))
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_parts();

        let user = AuthenticatedUser::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(user.user_id, user_id);
    }
}
