use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AccessTokenCodec, AuthorizationGuard, RefreshTokenStore};
use crate::configuration::Settings;
use crate::middleware::{FileServerHits, HitCounter, RequestId};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset, revoke, update_user,
};
use crate::storage::Store;

/// Build the HTTP server on an already bound listener
///
/// Every shared component is constructed once here from `settings` and
/// handed to workers as app data.
pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    settings: &Settings,
) -> Result<Server, std::io::Error> {
    let codec = Arc::new(AccessTokenCodec::new(&settings.jwt));
    let guard = web::Data::new(AuthorizationGuard::new(codec.clone()));
    let refresh_tokens = web::Data::new(RefreshTokenStore::new(store.clone(), &settings.jwt));
    let codec = web::Data::from(codec);
    let store = web::Data::from(store);
    let hits = web::Data::new(FileServerHits::new());
    let application = web::Data::new(settings.application.clone());
    let polka = web::Data::new(settings.polka.clone());
    let static_root = settings.application.static_root.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestId)
            .wrap(Logger::default())
            .app_data(store.clone())
            .app_data(codec.clone())
            .app_data(guard.clone())
            .app_data(refresh_tokens.clone())
            .app_data(hits.clone())
            .app_data(application.clone())
            .app_data(polka.clone())
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(create_user))
                    .route("/users", web::put().to(update_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/chirps", web::post().to(create_chirp))
                    .route("/chirps", web::get().to(list_chirps))
                    .route("/chirps/{chirp_id}", web::get().to(get_chirp))
                    .route("/chirps/{chirp_id}", web::delete().to(delete_chirp))
                    .route("/polka/webhooks", web::post().to(polka_webhook)),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )
            .service(
                web::scope("/app")
                    .wrap(HitCounter::new(hits.clone()))
                    .service(fs::Files::new("/", &static_root).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
