//! Lab account pool
//!
//! Manages a fixed set of pre-provisioned training accounts for a timed
//! event and hands out one account per participant, keyed by email. All
//! account state lives in a shared cache (`lab-cache`), so assignments
//! survive process restarts as long as the cache does.
//!
//! Account lifecycle:
//! 1. Startup builds N records in index order and hydrates each password
//!    from the credential file
//! 2. Blocklisted indices start disabled, the rest are explicitly enabled
//! 3. A participant requests an account → first assignable record by index
//! 4. The same email requesting again → the same account back (re-entry)
//! 5. Admins can unassign, block, or unblock accounts by username
//!
//! Assignment decisions are serialized through a pool-owned mutex so two
//! interleaved requests can never both claim the same account.

pub mod error;
pub mod pool;
pub mod record;

pub use error::{Error, Result};
pub use pool::{AccountPool, Assignment, PoolSettings, PoolSummary};
pub use record::{AccountRecord, AccountState};
