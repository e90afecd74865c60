/// Password Hashing and Verification
///
/// bcrypt produces a self-describing string (`$2b$<cost>$<salt><digest>`),
/// so verification needs nothing but the stored hash. Both operations are
/// deliberately slow; async callers should run them on the blocking pool.

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::AuthError;

lazy_static! {
    // same cost as stored hashes; the plaintext is never compared for a match
    static ref PLACEHOLDER_HASH: Result<String, AuthError> = hash_password("chirpy placeholder credential");
}

/// Hash a password using bcrypt
///
/// A fresh random salt is drawn for every call, so hashing the same
/// password twice yields different strings.
///
/// # Errors
/// Returns `AuthError::Hashing` only if bcrypt itself fails
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against its hash
///
/// A wrong password is `Ok(false)`, not an error.
///
/// # Errors
/// Returns `AuthError::Hashing` if `hash` is not a valid bcrypt string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    verify(password, hash).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Spend one verification's worth of work for a login with no matching user
///
/// Always `Ok(false)`, so an unknown email answers in the same time as a
/// wrong password.
///
/// # Errors
/// Returns `AuthError::Hashing` if the placeholder hash could not be built
pub fn verify_against_placeholder(password: &str) -> Result<bool, AuthError> {
    let placeholder = PLACEHOLDER_HASH.as_ref().map_err(Clone::clone)?;
    verify_password(password, placeholder).map(|_| false)
}
