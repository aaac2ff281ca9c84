//! Time source for ledger timestamps.

use taxsync_protocol::SyncTimestamp;

/// Supplies the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SyncTimestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SyncTimestamp {
        SyncTimestamp::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SyncTimestamp);

impl FixedClock {
    /// Creates a clock frozen at `secs` unix seconds.
    pub fn at(secs: u64) -> Self {
        Self(SyncTimestamp::from_unix_secs(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SyncTimestamp {
        self.0
    }
}
