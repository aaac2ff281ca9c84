//! Loopback wiring between the engine and the reference service.
//!
//! Lets integration tests drive a real [`HttpRemoteClient`] against an
//! in-process [`TaxService`] without opening sockets.

use std::sync::Arc;
use taxsync_engine::{
    HttpConfig, HttpMethod, HttpRemoteClient, HttpResponse, LoopbackClient, LoopbackServer,
    MemoryLedger, MemorySink, Reconciler, ReconcilerConfig, SyncLedger, SystemClock,
};
use taxsync_server::TaxService;

/// Base URL used for loopback requests.
pub const LOOPBACK_URL: &str = "memory://taxsync";

/// Adapts a shared [`TaxService`] to the engine's loopback server trait.
#[derive(Clone)]
pub struct ServiceLoopback {
    service: Arc<TaxService>,
}

impl ServiceLoopback {
    /// Wraps a service.
    pub fn new(service: Arc<TaxService>) -> Self {
        Self { service }
    }

    /// Returns the wrapped service.
    pub fn service(&self) -> &Arc<TaxService> {
        &self.service
    }
}

impl LoopbackServer for ServiceLoopback {
    fn handle(&self, method: HttpMethod, path: &str, body: Option<&[u8]>) -> HttpResponse {
        let response = self.service.handle(method.as_str(), path, body);
        HttpResponse::new(response.status, response.body)
    }
}

/// Remote client type used against the loopback service.
pub type LoopbackRemote = HttpRemoteClient<LoopbackClient<ServiceLoopback>>;

/// Builds an HTTP remote client that talks to `service` in process.
pub fn loopback_remote(service: Arc<TaxService>) -> LoopbackRemote {
    HttpRemoteClient::new(
        HttpConfig::new(LOOPBACK_URL),
        LoopbackClient::new(ServiceLoopback::new(service)),
    )
}

/// A reconciler talking to a reference service over the loopback client.
pub struct LoopbackHarness<L: SyncLedger = MemoryLedger> {
    /// The reference service.
    pub service: Arc<TaxService>,
    /// The reconciler under test.
    pub reconciler: Reconciler<LoopbackRemote, L, SystemClock>,
    /// Diagnostics recorded so far.
    pub sink: MemorySink,
}

impl LoopbackHarness<MemoryLedger> {
    /// Creates a harness with a fresh service and an in-memory ledger.
    pub fn new() -> Self {
        Self::with_ledger(MemoryLedger::new())
    }
}

impl<L: SyncLedger> LoopbackHarness<L> {
    /// Creates a harness with a fresh service and the given ledger.
    pub fn with_ledger(ledger: L) -> Self {
        let service = Arc::new(TaxService::default());
        let reconciler = Reconciler::new(
            ReconcilerConfig::default(),
            loopback_remote(Arc::clone(&service)),
            ledger,
        );
        Self {
            service,
            reconciler,
            sink: MemorySink::new(),
        }
    }
}

impl Default for LoopbackHarness<MemoryLedger> {
    fn default() -> Self {
        Self::new()
    }
}
