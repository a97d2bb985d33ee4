//! Shared cache access for lab account state
//!
//! The account pool persists per-account state as small JSON strings in a
//! keyed store. This crate defines that store contract ([`CacheStore`]) and
//! provides two implementations:
//!
//! - [`RedisStore`]: Redis via a pooled, reconnecting `ConnectionManager`.
//!   Used in deployments where assignments must survive process restarts.
//! - [`MemoryStore`]: an in-process map. Used by tests and single-node
//!   setups without a Redis instance.
//!
//! The store is externally owned state: callers get no transactions and no
//! retries. Failures surface as [`Error`] and propagate unchanged.

pub mod error;
pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

pub use crate::redis::RedisStore;
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use store::CacheStore;
