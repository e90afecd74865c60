/// Admin Routes
///
/// The hit counter view and the development-only reset.

use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::{AppError, AuthError};
use crate::middleware::FileServerHits;
use crate::storage::Store;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<FileServerHits>) -> HttpResponse {
    let body = format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>"#,
        hits.count()
    );

    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

/// POST /admin/reset
///
/// Zeroes the hit counter and deletes every user (chirps and refresh tokens
/// go with them). Refused unless the platform is `dev`.
pub async fn reset(
    hits: web::Data<FileServerHits>,
    store: web::Data<dyn Store>,
    settings: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if !settings.is_dev() {
        tracing::warn!(platform = %settings.platform, "Reset attempted outside dev");
        return Err(AuthError::Forbidden.into());
    }

    store.reset().await?;
    hits.reset();

    tracing::info!("Application state reset");
    Ok(HttpResponse::Ok().body("Hits reset to 0 and database reset to initial state."))
}
