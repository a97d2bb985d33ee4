//! Pool construction and the search/assignment engine.
//!
//! The pool owns the fixed, ordered record list and the store handle.
//! "First match" is always by ascending index, so allocation order is
//! deterministic and reproducible across runs with identical cache state.
//!
//! Every cache call is a suspension point, so two in-flight requests could
//! otherwise both observe an account as assignable before either one wrote
//! its claim. The pool closes that race by funnelling the whole
//! scan-and-assign sequence through `assign_lock`.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use lab_cache::CacheStore;
use lab_credentials::PasswordSource;

use crate::error::{Error, Result};
use crate::record::{AccountRecord, AccountState};

/// Pool construction settings.
///
/// `blocklist` entries are 1-based pool indices as strings, straight from
/// configuration; parsing them is part of pool generation and a bad entry
/// aborts startup.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub count: usize,
    pub prefix: String,
    pub pad_zeroes: bool,
    pub blocklist: Vec<String>,
}

/// Outcome of a get-and-assign request.
///
/// An exhausted pool is an expected state the request layer renders to the
/// participant, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Assigned(AccountState),
    NoCapacity,
}

/// Record counts for the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PoolSummary {
    pub total: usize,
    pub assigned: usize,
    pub assignable: usize,
    pub disabled: usize,
}

/// The fixed ordered set of lab accounts and its assignment operations.
pub struct AccountPool {
    records: Vec<AccountRecord>,
    store: Arc<dyn CacheStore>,
    assign_lock: Mutex<()>,
}

impl std::fmt::Debug for AccountPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountPool")
            .field("records", &self.records)
            .field("store", &"<dyn CacheStore>")
            .field("assign_lock", &self.assign_lock)
            .finish()
    }
}

impl AccountPool {
    /// Build the record list and establish each account's baseline cache
    /// entry.
    ///
    /// Records are built for indices `1..=count` in order. Indices in the
    /// block set start disabled; all others are explicitly enabled, which
    /// doubles as the idempotent baseline write for accounts the cache has
    /// never seen. A blocklist entry that is not a positive integer is a
    /// fatal error and no pool is produced.
    pub async fn generate(
        store: Arc<dyn CacheStore>,
        passwords: &PasswordSource,
        settings: &PoolSettings,
    ) -> Result<Self> {
        let blocked = parse_blocklist(&settings.blocklist)?;

        let mut records = Vec::with_capacity(settings.count);
        for index in 1..=settings.count {
            let mut record = AccountRecord::new(&settings.prefix, index, settings.pad_zeroes);
            record.hydrate(passwords);

            if blocked.contains(&index) {
                info!(username = %record.username(), "account disabled by blocklist");
                record.disable(store.as_ref()).await?;
            } else {
                record.enable(store.as_ref()).await?;
            }
            records.push(record);
        }

        info!(
            accounts = records.len(),
            blocked = blocked.len(),
            prefix = %settings.prefix,
            "account pool generated"
        );
        Ok(Self {
            records,
            store,
            assign_lock: Mutex::new(()),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current state of every account, pool order.
    pub async fn list_all(&self) -> Result<Vec<AccountState>> {
        let mut states = Vec::with_capacity(self.records.len());
        for record in &self.records {
            states.push(record.info(self.store.as_ref()).await?);
        }
        Ok(states)
    }

    /// First record whose persisted assignee email matches, pool order.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<&AccountRecord>> {
        for record in &self.records {
            let state = record.info(self.store.as_ref()).await?;
            if state.assignee_email.as_deref() == Some(email) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// First assignable record, pool order.
    pub async fn find_first_assignable(&self) -> Result<Option<&AccountRecord>> {
        for record in &self.records {
            if record.is_assignable(self.store.as_ref()).await? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Resolve a "give me an account" request.
    ///
    /// A participant whose email already holds an account gets that same
    /// account back with a fresh ip and timestamp, even if it has since
    /// been disabled. Otherwise the first assignable account is claimed.
    /// The whole sequence runs under the assignment mutex.
    pub async fn get_and_assign(&self, ip: &str, email: &str) -> Result<Assignment> {
        let _guard = self.assign_lock.lock().await;

        if let Some(record) = self.find_by_email(email).await? {
            debug!(email, username = %record.username(), "re-entry, returning existing account");
            record.assign(self.store.as_ref(), ip, email).await?;
            let state = record.info(self.store.as_ref()).await?;
            if state.disabled {
                warn!(username = %record.username(), "re-entry to a disabled account");
            }
            return Ok(Assignment::Assigned(state));
        }

        match self.find_first_assignable().await? {
            Some(record) => {
                record.assign(self.store.as_ref(), ip, email).await?;
                Ok(Assignment::Assigned(record.info(self.store.as_ref()).await?))
            }
            None => {
                warn!(email, "no assignable accounts remain");
                Ok(Assignment::NoCapacity)
            }
        }
    }

    /// Check that an issued assignment is still honored.
    ///
    /// Unknown usernames are invalid. A disabled account invalidates the
    /// assignment and is unassigned as a side effect, so it does not read
    /// as occupied once an admin re-enables it.
    pub async fn is_assignment_valid(&self, username: &str) -> Result<bool> {
        let Some(record) = self.find_record(username) else {
            debug!(username, "validity check for unknown account");
            return Ok(false);
        };

        let state = record.info(self.store.as_ref()).await?;
        if state.disabled {
            record.unassign(self.store.as_ref()).await?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Free an account by username.
    pub async fn unassign(&self, username: &str) -> Result<()> {
        self.require_record(username)?
            .unassign(self.store.as_ref())
            .await
    }

    /// Take an account out of the assignable set by username.
    pub async fn block(&self, username: &str) -> Result<()> {
        self.require_record(username)?
            .disable(self.store.as_ref())
            .await
    }

    /// Return an account to the assignable set by username.
    pub async fn unblock(&self, username: &str) -> Result<()> {
        self.require_record(username)?
            .enable(self.store.as_ref())
            .await
    }

    /// Count records by state.
    pub async fn summary(&self) -> Result<PoolSummary> {
        let mut summary = PoolSummary {
            total: self.records.len(),
            ..PoolSummary::default()
        };
        for state in self.list_all().await? {
            if state.is_assigned() {
                summary.assigned += 1;
            }
            if state.is_assignable() {
                summary.assignable += 1;
            }
            if state.disabled {
                summary.disabled += 1;
            }
        }
        Ok(summary)
    }

    fn find_record(&self, username: &str) -> Option<&AccountRecord> {
        self.records.iter().find(|r| r.username() == username)
    }

    fn require_record(&self, username: &str) -> Result<&AccountRecord> {
        self.find_record(username)
            .ok_or_else(|| Error::NotFound(username.to_owned()))
    }
}

/// Parse configured blocklist entries into 1-based indices.
fn parse_blocklist(entries: &[String]) -> Result<HashSet<usize>> {
    let mut blocked = HashSet::new();
    for entry in entries {
        let index: usize = entry
            .trim()
            .parse()
            .map_err(|_| Error::Blocklist(entry.clone()))?;
        if index == 0 {
            return Err(Error::Blocklist(entry.clone()));
        }
        blocked.insert(index);
    }
    Ok(blocked)
}
