//! Error types for credential loading

/// Errors from loading the credential file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("credential file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential file parse error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result alias for credential loading.
pub type Result<T> = std::result::Result<T, Error>;
