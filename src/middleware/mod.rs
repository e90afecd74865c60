/// Middleware module
///
/// Custom actix middleware. Authentication is an extractor
/// (`auth::AuthenticatedUser`) rather than middleware so it can be applied
/// per route.

mod hit_counter;
mod request_id;

pub use hit_counter::{FileServerHits, HitCounter};
pub use request_id::{current_request_id, RequestId, REQUEST_ID_HEADER};
