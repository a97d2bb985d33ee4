//! Per-account state machine over the shared cache.
//!
//! An [`AccountRecord`] is the immutable identity of one pool slot: its
//! username, its cache key, and the password hydrated from the credential
//! file. Everything mutable lives in the cache entry ([`AccountState`]), so
//! every operation reads fresh state, computes the next state, and writes it
//! back. The record itself never caches assignment data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use lab_cache::CacheStore;
use lab_credentials::PasswordSource;

use crate::error::{Error, Result};

/// Persisted state of one lab account.
///
/// Serialized as JSON under `user:<username>`. Absence of the cache key is
/// equivalent to the defaults: unassigned, not disabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountState {
    pub username: String,
    pub assigned_at: Option<DateTime<Utc>>,
    pub assignee_email: Option<String>,
    pub assignee_ip: Option<String>,
    pub disabled: bool,
    pub password: Option<String>,
}

impl AccountState {
    /// Baseline state for an account with no cache entry yet.
    fn unassigned(username: String, password: Option<String>) -> Self {
        Self {
            username,
            password,
            ..Self::default()
        }
    }

    /// Unassigned and not disabled.
    pub fn is_assignable(&self) -> bool {
        self.assigned_at.is_none() && !self.disabled
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_at.is_some()
    }
}

/// One pool slot's identity and operations.
///
/// [`new`](AccountRecord::new) performs no I/O; call
/// [`hydrate`](AccountRecord::hydrate) to attach the provisioned password
/// before the record is used. Operations take the store handle explicitly.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    username: String,
    cache_key: String,
    password: Option<String>,
}

impl AccountRecord {
    /// Build the record for a 1-based pool index.
    ///
    /// Username = prefix + index, zero-padded to two digits when
    /// `pad_zeroes` is set and the index is below 10.
    pub fn new(prefix: &str, index: usize, pad_zeroes: bool) -> Self {
        let username = if pad_zeroes && index < 10 {
            format!("{prefix}0{index}")
        } else {
            format!("{prefix}{index}")
        };
        let cache_key = lab_cache::keys::account(&username);
        Self {
            username,
            cache_key,
            password: None,
        }
    }

    /// Second construction phase: look up the provisioned password.
    ///
    /// A missing entry leaves the password unset; the account stays usable
    /// for assignment either way.
    pub fn hydrate(&mut self, passwords: &PasswordSource) {
        self.password = passwords.lookup(&self.username).map(str::to_owned);
        if self.password.is_none() {
            warn!(username = %self.username, "no password found for account");
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Read the current persisted state, falling back to the baseline when
    /// no cache entry exists yet.
    pub async fn info(&self, store: &dyn CacheStore) -> Result<AccountState> {
        match store.get(&self.cache_key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(AccountState::unassigned(
                self.username.clone(),
                self.password.clone(),
            )),
        }
    }

    pub async fn is_assignable(&self, store: &dyn CacheStore) -> Result<bool> {
        Ok(self.info(store).await?.is_assignable())
    }

    pub async fn is_assigned(&self, store: &dyn CacheStore) -> Result<bool> {
        Ok(self.info(store).await?.is_assigned())
    }

    /// Assign this account to a participant.
    ///
    /// Does not check `is_assignable`: the caller owns that decision, which
    /// is what lets re-entry hand a participant their account back even
    /// after an admin disabled it.
    pub async fn assign(&self, store: &dyn CacheStore, ip: &str, email: &str) -> Result<()> {
        if ip.is_empty() {
            return Err(Error::Validation("assignment requires an ip".into()));
        }
        if email.is_empty() {
            return Err(Error::Validation("assignment requires an email".into()));
        }

        let mut state = self.info(store).await?;
        state.assigned_at = Some(Utc::now());
        state.assignee_ip = Some(ip.to_owned());
        state.assignee_email = Some(email.to_owned());
        self.write(store, &state).await?;
        info!(username = %self.username, email, ip, "account assigned");
        Ok(())
    }

    /// Free this account for reassignment, keeping the disabled flag.
    pub async fn unassign(&self, store: &dyn CacheStore) -> Result<()> {
        let mut state = self.info(store).await?;
        state.assigned_at = None;
        state.assignee_ip = None;
        state.assignee_email = None;
        self.write(store, &state).await?;
        info!(username = %self.username, "account unassigned");
        Ok(())
    }

    /// Allow this account to be assigned again.
    pub async fn enable(&self, store: &dyn CacheStore) -> Result<()> {
        self.set_disabled(store, false).await
    }

    /// Take this account out of the assignable set. Any existing
    /// assignment is left in place; see `AccountPool::is_assignment_valid`
    /// for where a disabled assignment gets cleaned up.
    pub async fn disable(&self, store: &dyn CacheStore) -> Result<()> {
        self.set_disabled(store, true).await
    }

    async fn set_disabled(&self, store: &dyn CacheStore, disabled: bool) -> Result<()> {
        let mut state = self.info(store).await?;
        state.disabled = disabled;
        self.write(store, &state).await?;
        debug!(username = %self.username, disabled, "account disabled flag updated");
        Ok(())
    }

    async fn write(&self, store: &dyn CacheStore, state: &AccountState) -> Result<()> {
        let raw = serde_json::to_string(state)?;
        debug!(username = %self.username, "writing account state");
        store.set(&self.cache_key, &raw).await?;
        Ok(())
    }
}
