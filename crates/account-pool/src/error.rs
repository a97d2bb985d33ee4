//! Error types for pool operations

/// Errors from account pool operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid assignment request: {0}")]
    Validation(String),

    #[error("unable to find account with username {0}")]
    NotFound(String),

    #[error("invalid blocklist entry {0:?}: blocked accounts must be positive integers")]
    Blocklist(String),

    #[error("cache store error: {0}")]
    Cache(#[from] lab_cache::Error),

    #[error("account state encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result alias for pool operations.
pub type Result<T> = std::result::Result<T, Error>;
