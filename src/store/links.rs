//! Identity link store.
//!
//! # Responsibilities
//! - Durable mapping between chat identities and ledger accounts
//! - Single source of truth for administrator status
//! - Atomic check-and-insert / check-and-set under concurrent confirms
//!
//! # Design Decisions
//! - One mutex guards the whole table, so the uniqueness checks and the
//!   mutation form a single critical section (per-key locking cannot cover
//!   the two-index invariant).
//! - Persistence is a JSON file rewritten on every mutation via
//!   temp-file-and-rename; a failed write rolls the in-memory change back.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::types::AccountId;

/// Messaging-platform identifier of a chat user, independent of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformId(pub i64);

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One completed link between a chat identity and a ledger account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub platform_id: PlatformId,
    pub account_id: AccountId,
    pub is_admin: bool,
    pub display_handle: Option<String>,
}

/// Errors from link store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The chat identity already has a link record.
    #[error("chat identity is already linked")]
    AlreadyLinked,

    /// The ledger account is already controlled by another identity.
    #[error("account is already linked to another identity")]
    AccountAlreadyLinked,

    /// No link record exists for the chat identity.
    #[error("chat identity is not linked")]
    NotLinked,

    /// The identity is already an administrator.
    #[error("identity is already an administrator")]
    AlreadyAdmin,

    /// Promotion requires a non-empty display handle.
    #[error("no display handle supplied")]
    NoHandle,

    /// Writing the store file failed; the mutation was rolled back.
    #[error("link store persistence failed: {0}")]
    Persist(#[source] std::io::Error),

    /// The store file exists but does not parse.
    #[error("link store file corrupt: {0}")]
    Corrupt(String),

    /// A previous holder panicked while holding the table lock.
    #[error("link store lock poisoned")]
    Poisoned,
}

#[derive(Default)]
struct Table {
    /// Primary records, keyed by platform identity.
    by_platform: HashMap<i64, LinkRecord>,
    /// Secondary uniqueness index: account id -> owning platform id.
    by_account: HashMap<u32, i64>,
}

impl Table {
    fn insert(&mut self, record: LinkRecord) {
        self.by_account
            .insert(record.account_id.0, record.platform_id.0);
        self.by_platform.insert(record.platform_id.0, record);
    }
}

/// Thread-safe link store backed by a JSON file.
pub struct LinkStore {
    inner: Mutex<Table>,
    path: Option<PathBuf>,
}

impl LinkStore {
    /// Open the store at `path`, loading existing records if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut table = Table::default();
        if path.exists() {
            let file = File::open(&path).map_err(StoreError::Persist)?;
            let records: Vec<LinkRecord> = serde_json::from_reader(BufReader::new(file))
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            for record in records {
                table.insert(record);
            }
            tracing::info!(
                path = %path.display(),
                records = table.by_platform.len(),
                "Loaded link store"
            );
        }
        Ok(Self {
            inner: Mutex::new(table),
            path: Some(path),
        })
    }

    /// Create a store with no backing file. Used by tests.
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Table::default()),
            path: None,
        }
    }

    /// Resolve the ledger account bound to a chat identity.
    pub fn resolve_account(&self, platform: PlatformId) -> Result<Option<AccountId>, StoreError> {
        let table = self.lock()?;
        Ok(table.by_platform.get(&platform.0).map(|r| r.account_id))
    }

    /// Whether the identity is currently an administrator. Unlinked
    /// identities are never administrators.
    pub fn is_admin(&self, platform: PlatformId) -> Result<bool, StoreError> {
        let table = self.lock()?;
        Ok(table
            .by_platform
            .get(&platform.0)
            .map(|r| r.is_admin)
            .unwrap_or(false))
    }

    /// Whether any chat identity already controls this ledger account.
    pub fn account_linked(&self, account: AccountId) -> Result<bool, StoreError> {
        let table = self.lock()?;
        Ok(table.by_account.contains_key(&account.0))
    }

    /// Display handles of all administrators that have one.
    pub fn admin_handles(&self) -> Result<BTreeSet<String>, StoreError> {
        let table = self.lock()?;
        Ok(table
            .by_platform
            .values()
            .filter(|r| r.is_admin)
            .filter_map(|r| r.display_handle.clone())
            .filter(|h| !h.is_empty())
            .collect())
    }

    /// Bind a chat identity to a ledger account as a non-admin.
    ///
    /// The uniqueness checks on both keys and the insert happen under one
    /// lock, so of two concurrent calls for the same account exactly one
    /// succeeds.
    pub fn create_link(
        &self,
        platform: PlatformId,
        account: AccountId,
        handle: Option<String>,
    ) -> Result<(), StoreError> {
        let mut table = self.lock()?;
        if table.by_platform.contains_key(&platform.0) {
            return Err(StoreError::AlreadyLinked);
        }
        if table.by_account.contains_key(&account.0) {
            return Err(StoreError::AccountAlreadyLinked);
        }
        table.insert(LinkRecord {
            platform_id: platform,
            account_id: account,
            is_admin: false,
            display_handle: handle,
        });
        if let Err(e) = self.persist(&table) {
            table.by_platform.remove(&platform.0);
            table.by_account.remove(&account.0);
            return Err(e);
        }
        tracing::info!(platform = %platform, account = %account, "Created link");
        Ok(())
    }

    /// Promote a linked identity to administrator, storing its handle.
    pub fn promote(&self, platform: PlatformId, handle: Option<&str>) -> Result<(), StoreError> {
        let handle = handle.map(str::trim).filter(|h| !h.is_empty());
        let mut table = self.lock()?;
        let record = table
            .by_platform
            .get(&platform.0)
            .ok_or(StoreError::NotLinked)?;
        if record.is_admin {
            return Err(StoreError::AlreadyAdmin);
        }
        let handle = handle.ok_or(StoreError::NoHandle)?.to_string();
        let previous = record.clone();
        let record = table
            .by_platform
            .get_mut(&platform.0)
            .ok_or(StoreError::NotLinked)?;
        record.is_admin = true;
        record.display_handle = Some(handle);
        if let Err(e) = self.persist(&table) {
            table.by_platform.insert(platform.0, previous);
            return Err(e);
        }
        tracing::info!(platform = %platform, "Promoted to administrator");
        Ok(())
    }

    /// Insert the bootstrap administrator if absent. Idempotent across
    /// restarts; returns whether a record was created.
    pub fn seed_admin(&self, platform: PlatformId, account: AccountId) -> Result<bool, StoreError> {
        let mut table = self.lock()?;
        if table.by_platform.contains_key(&platform.0)
            || table.by_account.contains_key(&account.0)
        {
            return Ok(false);
        }
        table.insert(LinkRecord {
            platform_id: platform,
            account_id: account,
            is_admin: true,
            display_handle: None,
        });
        if let Err(e) = self.persist(&table) {
            table.by_platform.remove(&platform.0);
            table.by_account.remove(&account.0);
            return Err(e);
        }
        tracing::info!(platform = %platform, account = %account, "Seeded bootstrap administrator");
        Ok(true)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Table>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Write the full table to disk. Called with the lock held, so writers
    /// are serialized and the file always reflects a committed state.
    fn persist(&self, table: &Table) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let records: Vec<&LinkRecord> = table.by_platform.values().collect();
        let tmp = temp_path(path);
        let result = (|| {
            let file = File::create(&tmp)?;
            serde_json::to_writer_pretty(BufWriter::new(file), &records)
                .map_err(std::io::Error::other)?;
            fs::rename(&tmp, path)
        })();
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Persist(e));
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
