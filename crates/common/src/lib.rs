//! Common types for the lab account pool services

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
