//! Test fixtures and reconciliation helpers.
//!
//! Provides canned customer snapshots, scripted remote responses, and a
//! harness wiring a reconciler to in-memory collaborators.

use serde_json::json;
use std::path::PathBuf;
use taxsync_engine::{
    FileLedger, FixedClock, MemoryLedger, MemorySink, MockRemoteClient, Reconciler,
    ReconcilerConfig, RemoteResult, SyncOutcome,
};
use taxsync_protocol::{
    Address, CustomerId, CustomerSnapshot, ExemptRegion, ExemptionType, FailureSignal,
    RemoteResponse, SyncTimestamp,
};
use tempfile::TempDir;

/// Clock value used by the harness.
pub const FIXTURE_NOW: u64 = 1_700_000_000;

/// A complete US address.
pub fn sample_address() -> Address {
    Address {
        country: Some("US".into()),
        state_code: Some("CA".into()),
        postal_code: Some("94107".into()),
        city: Some("San Francisco".into()),
        street_full: Some("1 Market St".into()),
    }
}

/// A customer that has never been synced.
pub fn new_customer(id: &str) -> CustomerSnapshot {
    CustomerSnapshot::new(id, format!("Customer {id}"))
        .with_exemption_type(ExemptionType::Wholesale)
        .with_address(sample_address())
        .with_exempt_region(ExemptRegion::new("US", "CA"))
}

/// A customer that was synced an hour before [`FIXTURE_NOW`].
pub fn synced_customer(id: &str) -> CustomerSnapshot {
    new_customer(id).with_last_sync(SyncTimestamp::from_unix_secs(FIXTURE_NOW - 3600))
}

/// A customer without address or exemption data.
pub fn bare_customer(id: &str) -> CustomerSnapshot {
    CustomerSnapshot::new(id, format!("Customer {id}"))
}

/// A successful response echoing the customer.
pub fn confirmed(id: &str) -> RemoteResult {
    Ok(RemoteResponse::with_customer(json!({ "customer_id": id })))
}

/// A successful response with a null resource.
pub fn null_resource() -> RemoteResult {
    Ok(RemoteResponse::empty())
}

/// A failure with the given status and its JSON error body.
pub fn failure(status: u16) -> FailureSignal {
    FailureSignal::new(
        status,
        json!({ "status": status, "detail": format!("scripted {status}") }).to_string(),
    )
}

/// A reconciler wired to a mock remote, an in-memory ledger, and a fixed clock.
pub struct TestHarness {
    /// The reconciler under test.
    pub reconciler: Reconciler<MockRemoteClient, MemoryLedger, FixedClock>,
    /// Diagnostics recorded so far.
    pub sink: MemorySink,
}

impl TestHarness {
    /// Creates a harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(ReconcilerConfig::default())
    }

    /// Creates a harness with the given configuration.
    pub fn with_config(config: ReconcilerConfig) -> Self {
        Self {
            reconciler: Reconciler::with_clock(
                config,
                MockRemoteClient::new(),
                MemoryLedger::new(),
                FixedClock::at(FIXTURE_NOW),
            ),
            sink: MemorySink::new(),
        }
    }

    /// Returns the mock remote.
    pub fn remote(&self) -> &MockRemoteClient {
        self.reconciler.remote()
    }

    /// Returns the ledger.
    pub fn ledger(&self) -> &MemoryLedger {
        self.reconciler.ledger()
    }

    /// Runs a created event.
    pub fn created(&self, snapshot: &CustomerSnapshot) -> SyncOutcome {
        self.reconciler.on_customer_created(snapshot, &self.sink)
    }

    /// Runs an updated event.
    pub fn updated(&self, snapshot: &CustomerSnapshot) -> SyncOutcome {
        self.reconciler.on_customer_updated(snapshot, &self.sink)
    }

    /// Runs a deleted event.
    pub fn deleted(&self, id: &str) -> SyncOutcome {
        self.reconciler
            .on_customer_deleted(&CustomerId::new(id), &self.sink)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A file ledger in a temporary directory.
pub struct TempLedger {
    /// The ledger.
    pub ledger: FileLedger,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TempLedger {
    /// Creates an empty ledger file location.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ledger =
            FileLedger::open(temp_dir.path().join("ledger.json")).expect("Failed to open ledger");
        Self {
            ledger,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the ledger file path.
    pub fn path(&self) -> PathBuf {
        self.ledger.path().to_path_buf()
    }
}

impl Default for TempLedger {
    fn default() -> Self {
        Self::new()
    }
}
