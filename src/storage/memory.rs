//! In-process implementation of Store
//!
//! Enforces the same uniqueness and foreign-key rules as the Postgres
//! schema so handlers behave identically against either backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Chirp, RefreshTokenRecord, Store, StoreResult, User};
use crate::error::{AppError, DatabaseError};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    chirps: Vec<Chirp>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(what: &str) -> AppError {
    AppError::Database(DatabaseError::UniqueConstraintViolation(what.to_string()))
}

fn missing_user(id: Uuid) -> AppError {
    AppError::Database(DatabaseError::QueryExecution(format!(
        "foreign key violation: user {} does not exist",
        id
    )))
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(duplicate("Email already registered"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: now,
            updated_at: now,
            is_chirpy_red: false,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: Uuid, email: &str, hashed_password: &str) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email && u.id != id) {
            return Err(duplicate("Email already registered"));
        }

        Ok(tables.users.get_mut(&id).map(|user| {
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(&id) {
            Some(user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&record.user_id) {
            return Err(missing_user(record.user_id));
        }
        if tables.refresh_tokens.contains_key(&record.token) {
            return Err(duplicate("Resource already exists"));
        }

        tables.refresh_tokens.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshTokenRecord>> {
        Ok(self.tables.read().await.refresh_tokens.get(token).cloned())
    }

    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(record) = tables.refresh_tokens.get_mut(token) {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(at);
                record.updated_at = at;
            }
        }
        Ok(())
    }

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> StoreResult<Chirp> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(missing_user(user_id));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        tables.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn get_chirp(&self, id: Uuid) -> StoreResult<Option<Chirp>> {
        let tables = self.tables.read().await;
        Ok(tables.chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn list_chirps(&self) -> StoreResult<Vec<Chirp>> {
        // insertion order is creation order
        Ok(self.tables.read().await.chirps.clone())
    }

    async fn delete_chirp(&self, id: Uuid) -> StoreResult<()> {
        self.tables.write().await.chirps.retain(|c| c.id != id);
        Ok(())
    }

    async fn reset(&self) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.users.clear();
        tables.refresh_tokens.clear();
        tables.chirps.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_for(user_id: Uuid, token: &str) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            token: token.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(60),
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_user("a@example.com", "hash").await.unwrap();

        let result = store.create_user("a@example.com", "hash").await;
        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_)))
        ));
    }

    #[tokio::test]
    async fn test_refresh_token_requires_existing_user() {
        let store = MemoryStore::new();
        let result = store.create_refresh_token(&record_for(Uuid::new_v4(), "t1")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_refresh_token_value_is_unique() {
        let store = MemoryStore::new();
        let a = store.create_user("a@example.com", "hash").await.unwrap();
        let b = store.create_user("b@example.com", "hash").await.unwrap();

        store.create_refresh_token(&record_for(a.id, "same")).await.unwrap();
        let result = store.create_refresh_token(&record_for(b.id, "same")).await;

        assert!(result.is_err());
        let stored = store.get_refresh_token("same").await.unwrap().unwrap();
        assert_eq!(stored.user_id, a.id);
    }

    #[tokio::test]
    async fn test_second_revoke_keeps_first_timestamp() {
        let store = MemoryStore::new();
        let user = store.create_user("a@example.com", "hash").await.unwrap();
        store.create_refresh_token(&record_for(user.id, "t1")).await.unwrap();

        let first = Utc::now();
        store.revoke_refresh_token("t1", first).await.unwrap();
        store
            .revoke_refresh_token("t1", first + Duration::seconds(30))
            .await
            .unwrap();

        let stored = store.get_refresh_token("t1").await.unwrap().unwrap();
        assert_eq!(stored.revoked_at, Some(first));
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let store = MemoryStore::new();
        let user = store.create_user("a@example.com", "hash").await.unwrap();
        store.create_chirp(user.id, "hello").await.unwrap();
        store.create_refresh_token(&record_for(user.id, "t1")).await.unwrap();

        store.reset().await.unwrap();

        assert!(store.get_user_by_id(user.id).await.unwrap().is_none());
        assert!(store.list_chirps().await.unwrap().is_empty());
        assert!(store.get_refresh_token("t1").await.unwrap().is_none());
    }
}
