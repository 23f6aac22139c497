//! In-memory game sessions keyed by a random id.
//!
//! Each game owns one store, so concurrent players never share state.

use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::error::{GameError, GameResult};

pub type SessionId = u32;

pub struct SessionStore<S> {
    sessions: Mutex<HashMap<SessionId, S>>,
}

impl<S> Default for SessionStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SessionStore<S> {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Store a new session under a fresh id.
    pub async fn insert(&self, session: S) -> SessionId {
        let mut sessions = self.sessions.lock().await;
        let mut id = rand::random_range(1000..=9999);
        // widen past the four-digit range once it fills up
        while sessions.contains_key(&id) {
            id = rand::random_range(1000..SessionId::MAX);
        }
        sessions.insert(id, session);
        id
    }

    /// Run `f` against the session while holding the lock.
    pub async fn with<R>(&self, id: SessionId, f: impl FnOnce(&mut S) -> R) -> GameResult<R> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(GameError::UnknownSession(id))?;
        Ok(f(session))
    }

    pub async fn remove(&self, id: SessionId) -> Option<S> {
        self.sessions.lock().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<S: Clone> SessionStore<S> {
    pub async fn get(&self, id: SessionId) -> GameResult<S> {
        self.with(id, |s| s.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let store = SessionStore::new();
        let a = store.insert("a".to_string()).await;
        let b = store.insert("b".to_string()).await;
        assert_ne!(a, b);
        assert_eq!(store.get(a).await.unwrap(), "a");
        assert_eq!(store.get(b).await.unwrap(), "b");
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_id_is_an_error() {
        let store: SessionStore<u8> = SessionStore::new();
        match store.with(42, |s| *s += 1).await {
            Err(GameError::UnknownSession(42)) => {}
            other => panic!("expected UnknownSession, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_with_mutates_in_place() {
        let store = SessionStore::new();
        let id = store.insert(vec![1]).await;
        store.with(id, |v| v.push(2)).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = SessionStore::new();
        let id = store.insert(1u8).await;
        assert_eq!(store.remove(id).await, Some(1));
        assert!(store.remove(id).await.is_none());
        assert!(store.is_empty().await);
    }
}
