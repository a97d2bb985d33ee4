//! In-process cache store.
//!
//! Holds account state in a mutex-guarded map. Assignments do not survive a
//! restart with this provider; it exists for tests and for running the
//! service without a Redis instance.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::store::CacheStore;

/// In-memory implementation of [`CacheStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self.state.lock().await;
        Ok(state.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("user:player1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let store = MemoryStore::new();
        store.set("user:player1", r#"{"username":"player1"}"#).await.unwrap();
        assert_eq!(
            store.get("user:player1").await.unwrap().as_deref(),
            Some(r#"{"username":"player1"}"#)
        );
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = MemoryStore::new();
        store.set("k", "first").await.unwrap();
        store.set("k", "second").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn del_removes_key_and_tolerates_absent_key() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();
        store.del("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        // deleting again is not an error
        store.del("k").await.unwrap();
    }

    #[tokio::test]
    async fn health_check_is_always_ok() {
        let store = MemoryStore::new();
        assert!(store.health_check().await.unwrap());
    }
}
