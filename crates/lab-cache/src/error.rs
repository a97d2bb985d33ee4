//! Error types for cache operations

/// Errors from cache store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cache connection failed: {0}")]
    Connect(String),

    #[error("cache command failed: {0}")]
    Command(String),
}

/// Result alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
