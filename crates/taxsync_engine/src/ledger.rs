//! Sync ledger: the local record of the last confirmed sync per customer.

use crate::error::{LedgerError, LedgerResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use taxsync_protocol::{CustomerId, SyncTimestamp};

/// Tracks the last confirmed sync time of each customer.
///
/// The reconciler reads it to choose between create and update, and writes
/// it exactly once per confirmed reconciliation.
pub trait SyncLedger: Send + Sync {
    /// Returns the last confirmed sync time of a customer.
    fn last_synced(&self, id: &CustomerId) -> Option<SyncTimestamp>;

    /// Records a confirmed sync.
    fn mark_synced(&self, id: &CustomerId, timestamp: SyncTimestamp) -> LedgerResult<()>;

    /// Returns true if the customer has ever been confirmed.
    fn has_synced(&self, id: &CustomerId) -> bool {
        self.last_synced(id).is_some()
    }
}

impl<L: SyncLedger + ?Sized> SyncLedger for Box<L> {
    fn last_synced(&self, id: &CustomerId) -> Option<SyncTimestamp> {
        (**self).last_synced(id)
    }

    fn mark_synced(&self, id: &CustomerId, timestamp: SyncTimestamp) -> LedgerResult<()> {
        (**self).mark_synced(id, timestamp)
    }
}

/// An in-memory ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<HashMap<CustomerId, SyncTimestamp>>,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry without counting it as a write.
    pub fn insert(&self, id: impl Into<CustomerId>, timestamp: SyncTimestamp) {
        self.entries.write().insert(id.into(), timestamp);
    }

    /// Makes subsequent writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of successful writes.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the number of customers in the ledger.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SyncLedger for MemoryLedger {
    fn last_synced(&self, id: &CustomerId) -> Option<SyncTimestamp> {
        self.entries.read().get(id).copied()
    }

    fn mark_synced(&self, id: &CustomerId, timestamp: SyncTimestamp) -> LedgerResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("writes disabled".into()));
        }
        self.entries.write().insert(id.clone(), timestamp);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A ledger persisted as a JSON file.
///
/// The file holds `{"<customer id>": <unix seconds>, ...}`. Every write
/// rewrites the whole file through a temporary sibling and a rename, so a
/// crash leaves either the old or the new contents.
pub struct FileLedger {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, SyncTimestamp>>,
}

impl FileLedger {
    /// Opens the ledger at `path`. A missing file is an empty ledger.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened ledger");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Returns the ledger path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all entries ordered by customer ID.
    pub fn entries(&self) -> Vec<(CustomerId, SyncTimestamp)> {
        self.entries
            .read()
            .iter()
            .map(|(id, ts)| (CustomerId::new(id.clone()), *ts))
            .collect()
    }

    fn persist(&self, entries: &BTreeMap<String, SyncTimestamp>) -> LedgerResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = fs::File::create(&tmp_path)?;
        serde_json::to_writer_pretty(&mut file, entries)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl SyncLedger for FileLedger {
    fn last_synced(&self, id: &CustomerId) -> Option<SyncTimestamp> {
        self.entries.read().get(id.as_str()).copied()
    }

    fn mark_synced(&self, id: &CustomerId, timestamp: SyncTimestamp) -> LedgerResult<()> {
        let mut entries = self.entries.write();
        let previous = entries.insert(id.to_string(), timestamp);

        if let Err(e) = self.persist(&entries) {
            // Keep memory consistent with disk
            match previous {
                Some(ts) => entries.insert(id.to_string(), ts),
                None => entries.remove(id.as_str()),
            };
            return Err(e);
        }
        Ok(())
    }
}
