//! Session storage.
//!
//! Persisting sessions is the application's concern; the guard only needs
//! keyed lookup. [`MemorySessionStorage`] keeps sessions in process memory,
//! which suits tests and single-instance development servers.

use crate::auth::{AuthError, Session};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keyed storage for [`Session`]s.
///
/// Implementations decide their own consistency and timeout behavior; the
/// guard awaits each call without a timeout of its own.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Stores `session` under its `id`, replacing any previous value.
    async fn store_session(&self, session: Session) -> Result<(), AuthError>;

    /// Loads the session stored under `id`.
    async fn load_session(&self, id: &str) -> Result<Option<Session>, AuthError>;

    /// Deletes the session stored under `id`, returning whether one existed.
    async fn delete_session(&self, id: &str) -> Result<bool, AuthError>;
}

/// In-process [`SessionStorage`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no sessions are stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn store_session(&self, session: Session) -> Result<(), AuthError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn load_session(&self, id: &str) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn delete_session(&self, id: &str) -> Result<bool, AuthError> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopDomain;

    fn offline_session() -> Session {
        let shop = ShopDomain::new("testing-shop").unwrap();
        Session::new(
            Session::offline_id(&shop),
            shop,
            Some("token".to_string()),
            "write_shipping".parse().unwrap(),
            false,
            None,
        )
    }

    #[tokio::test]
    async fn test_store_load_and_delete() {
        let storage = MemorySessionStorage::new();
        assert!(storage.is_empty().await);

        let session = offline_session();
        storage.store_session(session.clone()).await.unwrap();
        assert_eq!(storage.len().await, 1);

        let loaded = storage.load_session(&session.id).await.unwrap();
        assert_eq!(loaded, Some(session.clone()));

        assert!(storage.delete_session(&session.id).await.unwrap());
        assert!(!storage.delete_session(&session.id).await.unwrap());
        assert_eq!(storage.load_session(&session.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_replaces_existing_session() {
        let storage = MemorySessionStorage::new();
        let mut session = offline_session();
        storage.store_session(session.clone()).await.unwrap();

        session.access_token = Some("rotated".to_string());
        storage.store_session(session.clone()).await.unwrap();

        let loaded = storage.load_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("rotated"));
        assert_eq!(storage.len().await, 1);
    }
}
