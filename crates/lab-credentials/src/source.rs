//! Load-once CSV credential lookup.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::Result;

/// One row of the credential file.
#[derive(Debug, Deserialize)]
struct CredentialRow {
    username: String,
    password: String,
}

/// Keyed username → password lookup, loaded once at startup.
#[derive(Debug, Default)]
pub struct PasswordSource {
    passwords: HashMap<String, String>,
}

impl PasswordSource {
    /// Parse a credential file from disk.
    ///
    /// The file must have a `username,password` header. Duplicate usernames
    /// keep the last row, matching what operators expect from appending
    /// corrections to the file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let source = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            entries = source.passwords.len(),
            "loaded credential file"
        );
        Ok(source)
    }

    /// Parse credential rows from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
        let mut passwords = HashMap::new();
        for row in csv_reader.deserialize() {
            let row: CredentialRow = row?;
            passwords.insert(row.username, row.password);
        }
        Ok(Self { passwords })
    }

    /// A source with no entries, for deployments without a credential file.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up the password for a username.
    pub fn lookup(&self, username: &str) -> Option<&str> {
        self.passwords.get(username).map(String::as_str)
    }

    /// Number of loaded entries.
    pub fn len(&self) -> usize {
        self.passwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passwords.is_empty()
    }
}
