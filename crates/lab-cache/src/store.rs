//! The keyed store contract the account pool writes through.

use async_trait::async_trait;

use crate::error::Result;

/// Keyed get/set/delete store for small string values.
///
/// Implementations make no atomicity guarantees across calls; callers that
/// need a consistent read-modify-write sequence must serialize it
/// themselves.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value, overwriting any existing entry.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn del(&self, key: &str) -> Result<()>;

    /// Probe backend liveness.
    async fn health_check(&self) -> Result<bool>;
}
