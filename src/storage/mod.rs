//! Storage collaborator
//!
//! The auth core only needs simple keyed reads and writes, expressed by the
//! [`Store`] trait. `PgStore` backs it with Postgres; `MemoryStore` keeps
//! everything in process for tests and local runs. Per-row atomicity is the
//! implementation's responsibility.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

/// Persisted refresh token. `revoked_at == None` means active.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// A token is no longer usable from the instant `expires_at` is reached.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A post. `user_id` is the owner and is never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, email: &str, hashed_password: &str) -> StoreResult<User>;

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Returns `None` when no user has this id.
    async fn update_user(&self, id: Uuid, email: &str, hashed_password: &str) -> StoreResult<Option<User>>;

    /// Returns `false` when no user has this id.
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> StoreResult<()>;

    async fn get_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshTokenRecord>>;

    /// Sets `revoked_at` (and `updated_at`) to `at` unless already revoked.
    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> StoreResult<()>;

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> StoreResult<Chirp>;

    async fn get_chirp(&self, id: Uuid) -> StoreResult<Option<Chirp>>;

    /// All chirps, oldest first.
    async fn list_chirps(&self) -> StoreResult<Vec<Chirp>>;

    async fn delete_chirp(&self, id: Uuid) -> StoreResult<()>;

    /// Delete every user along with their chirps and refresh tokens.
    async fn reset(&self) -> StoreResult<()>;
}
