//! Static credential lookup for lab accounts
//!
//! Lab accounts are provisioned ahead of the event and their passwords are
//! delivered as a CSV file (`username,password`). This crate parses that
//! file once at startup into a [`PasswordSource`] the pool queries while it
//! builds its records. The file is never re-read at runtime; a username
//! without a matching row simply gets no password, which does not make the
//! account unusable for assignment.

pub mod error;
pub mod source;

pub use error::{Error, Result};
pub use source::PasswordSource;
