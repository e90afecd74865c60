/// Authentication module
///
/// Password hashing, access token issue/validation, bearer header framing,
/// the refresh token lifecycle, and the ownership guard built on top of them.

mod bearer;
mod claims;
mod guard;
mod jwt;
mod password;
mod refresh_token;

pub use bearer::{authorization_header, extract_api_key, extract_bearer};
pub use claims::Claims;
pub use guard::{AuthenticatedUser, AuthorizationGuard};
pub use jwt::{AccessTokenCodec, SIGNING_ALGORITHM};
pub use password::{hash_password, verify_against_placeholder, verify_password};
pub use refresh_token::{generate_refresh_token, RefreshTokenStore};
