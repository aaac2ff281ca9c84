//! Customer reconciliation state machine.

use crate::clock::{Clock, SystemClock};
use crate::config::ReconcilerConfig;
use crate::diagnostics::{DiagnosticLevel, DiagnosticsSink};
use crate::error::SyncError;
use crate::ledger::SyncLedger;
use crate::remote::{RemoteClient, RemoteOperation, RemoteResult};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use taxsync_protocol::{
    map, CustomerId, CustomerSnapshot, EventKind, FailureSignal, RemoteResponse, SyncEvent,
    SyncPayload, SyncTimestamp,
};

/// Result of reconciling one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// True only when the final response echoed a non-null resource.
    pub confirmed: bool,
    /// Customer ID echoed by the remote service.
    pub remote_customer_id: Option<String>,
    /// Sync time recorded (or attempted) in the ledger.
    pub timestamp_to_persist: Option<SyncTimestamp>,
}

impl SyncOutcome {
    /// An outcome without confirmation.
    pub fn unconfirmed() -> Self {
        Self::default()
    }
}

/// The fallback half of a [`SyncPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallback {
    /// Status of the primary failure that triggers the fallback.
    pub trigger_status: u16,
    /// Operation attempted instead.
    pub operation: RemoteOperation,
}

/// Operations chosen for an event before any call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPlan {
    /// First operation attempted.
    pub primary: RemoteOperation,
    /// Single alternate operation, if any.
    pub fallback: Option<Fallback>,
}

impl SyncPlan {
    /// Chooses the operations for an event given the ledger state.
    ///
    /// | Event           | Synced | Primary | Fallback          |
    /// |-----------------|--------|---------|-------------------|
    /// | Created/Updated | no     | create  | update on 422     |
    /// | Created/Updated | yes    | update  | create on 404     |
    /// | Deleted         | any    | delete  | none              |
    pub fn for_event(kind: EventKind, synced: bool, config: &ReconcilerConfig) -> Self {
        match (kind, synced) {
            (EventKind::Deleted, _) => SyncPlan {
                primary: RemoteOperation::Delete,
                fallback: None,
            },
            (_, false) => SyncPlan {
                primary: RemoteOperation::Create,
                fallback: Some(Fallback {
                    trigger_status: config.create_conflict_status,
                    operation: RemoteOperation::Update,
                }),
            },
            (_, true) => SyncPlan {
                primary: RemoteOperation::Update,
                fallback: Some(Fallback {
                    trigger_status: config.update_missing_status,
                    operation: RemoteOperation::Create,
                }),
            },
        }
    }
}

/// Counters over all events handled by a reconciler.
#[derive(Debug, Clone, Default)]
pub struct ReconcileStats {
    /// Events handled.
    pub events_handled: u64,
    /// Events that ended confirmed.
    pub confirmed: u64,
    /// Events that ended unconfirmed.
    pub unconfirmed: u64,
    /// Fallback calls attempted.
    pub fallbacks: u64,
    /// Ledger writes that failed after confirmation.
    pub ledger_failures: u64,
    /// Last recorded sync time.
    pub last_sync: Option<SyncTimestamp>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Keeps the remote customer resource in step with local customer events.
///
/// Each event makes at most two sequential remote calls: the primary
/// operation and, when the primary fails with its trigger status, one
/// fallback. The ledger is written only for confirmed create/update events.
pub struct Reconciler<R: RemoteClient, L: SyncLedger, C: Clock = SystemClock> {
    config: ReconcilerConfig,
    remote: Arc<R>,
    ledger: Arc<L>,
    clock: C,
    stats: RwLock<ReconcileStats>,
}

impl<R: RemoteClient, L: SyncLedger> Reconciler<R, L, SystemClock> {
    /// Creates a reconciler using wall-clock time.
    pub fn new(config: ReconcilerConfig, remote: R, ledger: L) -> Self {
        Self::with_clock(config, remote, ledger, SystemClock)
    }
}

impl<R: RemoteClient, L: SyncLedger, C: Clock> Reconciler<R, L, C> {
    /// Creates a reconciler with an explicit clock.
    pub fn with_clock(config: ReconcilerConfig, remote: R, ledger: L, clock: C) -> Self {
        Self::from_shared(config, Arc::new(remote), Arc::new(ledger), clock)
    }

    /// Creates a reconciler over collaborators shared with the caller.
    pub fn from_shared(config: ReconcilerConfig, remote: Arc<R>, ledger: Arc<L>, clock: C) -> Self {
        Self {
            config,
            remote,
            ledger,
            clock,
            stats: RwLock::new(ReconcileStats::default()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Returns the remote client.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns the ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Returns a copy of the counters.
    pub fn stats(&self) -> ReconcileStats {
        self.stats.read().clone()
    }

    /// Reconciles a newly created customer.
    pub fn on_customer_created(
        &self,
        snapshot: &CustomerSnapshot,
        sink: &dyn DiagnosticsSink,
    ) -> SyncOutcome {
        self.run(EventKind::Created, || self.reconcile_upsert(EventKind::Created, snapshot, sink))
    }

    /// Reconciles an updated customer.
    pub fn on_customer_updated(
        &self,
        snapshot: &CustomerSnapshot,
        sink: &dyn DiagnosticsSink,
    ) -> SyncOutcome {
        self.run(EventKind::Updated, || self.reconcile_upsert(EventKind::Updated, snapshot, sink))
    }

    /// Reconciles a customer that is being deleted.
    pub fn on_customer_deleted(&self, id: &CustomerId, sink: &dyn DiagnosticsSink) -> SyncOutcome {
        self.run(EventKind::Deleted, || self.reconcile_delete(id, sink))
    }

    /// Reconciles any event.
    pub fn handle(&self, event: &SyncEvent, sink: &dyn DiagnosticsSink) -> SyncOutcome {
        match event {
            SyncEvent::Created(snapshot) => self.on_customer_created(snapshot, sink),
            SyncEvent::Updated(snapshot) => self.on_customer_updated(snapshot, sink),
            SyncEvent::Deleted(id) => self.on_customer_deleted(id, sink),
        }
    }

    /// Returns the plan an event would follow right now.
    pub fn plan(&self, event: &SyncEvent) -> SyncPlan {
        let synced = event.snapshot().is_some_and(|s| self.has_synced(s));
        SyncPlan::for_event(event.kind(), synced, &self.config)
    }

    fn has_synced(&self, snapshot: &CustomerSnapshot) -> bool {
        snapshot.has_synced() || self.ledger.has_synced(&snapshot.id)
    }

    fn run(&self, kind: EventKind, reconcile: impl FnOnce() -> SyncOutcome) -> SyncOutcome {
        let outcome = reconcile();

        let mut stats = self.stats.write();
        stats.events_handled += 1;
        if outcome.confirmed {
            stats.confirmed += 1;
        } else {
            stats.unconfirmed += 1;
        }
        drop(stats);

        tracing::debug!(event = %kind, confirmed = outcome.confirmed, "event reconciled");
        outcome
    }

    fn reconcile_upsert(
        &self,
        kind: EventKind,
        snapshot: &CustomerSnapshot,
        sink: &dyn DiagnosticsSink,
    ) -> SyncOutcome {
        let id = &snapshot.id;
        let payload = map(snapshot);
        let plan = SyncPlan::for_event(kind, self.has_synced(snapshot), &self.config);

        let result = match self.call(plan.primary, id, Some(&payload)) {
            Ok(response) => Ok(response),
            Err(failure) => {
                let error = SyncError::classify(plan.primary, id, &failure, &self.config);
                match plan.fallback {
                    Some(fallback) if error.is_fallback_trigger() => {
                        self.attempt_fallback(plan.primary, fallback, id, &payload, &failure, sink)
                    }
                    _ => Err(error),
                }
            }
        };

        match result {
            Ok(response) => self.confirm(id, &response, true, sink),
            Err(error) => self.fail(&error, sink),
        }
    }

    fn attempt_fallback(
        &self,
        primary: RemoteOperation,
        fallback: Fallback,
        id: &CustomerId,
        payload: &SyncPayload,
        primary_failure: &FailureSignal,
        sink: &dyn DiagnosticsSink,
    ) -> Result<RemoteResponse, SyncError> {
        let message = format!(
            "Could not {primary} customer #{id}, attempting to {} instead",
            fallback.operation
        );
        tracing::warn!(customer_id = %id, status = fallback.trigger_status, "{message}");
        sink.emit(DiagnosticLevel::Fallback, &message);
        self.stats.write().fallbacks += 1;

        self.call(fallback.operation, id, Some(payload))
            .map_err(|failure| SyncError::FallbackExhausted {
                customer_id: id.clone(),
                primary,
                primary_message: primary_failure.raw_message.clone(),
                fallback: fallback.operation,
                fallback_message: failure.raw_message,
            })
    }

    fn reconcile_delete(&self, id: &CustomerId, sink: &dyn DiagnosticsSink) -> SyncOutcome {
        match self.call(RemoteOperation::Delete, id, None) {
            // The local entity is going away, so there is nothing to record.
            Ok(response) => self.confirm(id, &response, false, sink),
            Err(failure) => {
                let error =
                    SyncError::classify(RemoteOperation::Delete, id, &failure, &self.config);
                self.fail(&error, sink)
            }
        }
    }

    fn call(
        &self,
        operation: RemoteOperation,
        id: &CustomerId,
        payload: Option<&SyncPayload>,
    ) -> RemoteResult {
        let span = tracing::debug_span!("remote_call", %operation, customer_id = %id);
        let _enter = span.enter();

        let resource = self.config.resource.as_str();
        let result = match (operation, payload) {
            (RemoteOperation::Create, Some(payload)) => self.remote.create(resource, payload),
            (RemoteOperation::Update, Some(payload)) => {
                self.remote.update(resource, id, payload)
            }
            (RemoteOperation::Delete, _) => self.remote.delete(resource, id),
            (_, None) => Err(FailureSignal::transport(format!(
                "{operation} requires a payload"
            ))),
        };

        match &result {
            Ok(response) => tracing::debug!(confirmed = response.is_confirmed(), "remote call succeeded"),
            Err(failure) => tracing::debug!(status = ?failure.status_code, "remote call failed"),
        }
        result
    }

    fn confirm(
        &self,
        id: &CustomerId,
        response: &RemoteResponse,
        record: bool,
        sink: &dyn DiagnosticsSink,
    ) -> SyncOutcome {
        if !response.is_confirmed() {
            tracing::debug!(customer_id = %id, "remote response carried no customer");
            return SyncOutcome::unconfirmed();
        }

        let body = response
            .to_json_string()
            .unwrap_or_else(|e| format!("<unencodable response: {e}>"));
        sink.emit(
            DiagnosticLevel::Success,
            &format!("Successful API response: {body}"),
        );
        tracing::info!(customer_id = %id, "customer confirmed by remote");

        let mut outcome = SyncOutcome {
            confirmed: true,
            remote_customer_id: response.remote_customer_id(),
            timestamp_to_persist: None,
        };

        if record {
            let timestamp = self.clock.now();
            outcome.timestamp_to_persist = Some(timestamp);

            match self.ledger.mark_synced(id, timestamp) {
                Ok(()) => self.stats.write().last_sync = Some(timestamp),
                Err(source) => {
                    // Remote state is already correct; only bookkeeping is lost.
                    let error = SyncError::Persistence {
                        customer_id: id.clone(),
                        source,
                    };
                    tracing::error!(customer_id = %id, error = %error, "ledger write failed");
                    sink.emit(DiagnosticLevel::Error, &error.to_string());

                    let mut stats = self.stats.write();
                    stats.ledger_failures += 1;
                    stats.last_error = Some(error.to_string());
                }
            }
        }

        outcome
    }

    fn fail(&self, error: &SyncError, sink: &dyn DiagnosticsSink) -> SyncOutcome {
        let message = error.to_string();
        tracing::error!(error = %message, "customer sync failed");
        sink.emit(DiagnosticLevel::Error, &message);
        self.stats.write().last_error = Some(message);
        SyncOutcome::unconfirmed()
    }
}
