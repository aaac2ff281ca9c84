//! # TaxSync Engine
//!
//! Customer reconciliation engine for TaxSync.
//!
//! This crate provides:
//! - The reconciliation state machine (create/update/delete with one fallback)
//! - The sync ledger (in-memory and JSON file backed)
//! - The remote client abstraction and its HTTP implementation
//! - Diagnostics sinks
//!
//! ## Architecture
//!
//! Every customer event is reconciled with at most two remote calls:
//! 1. The primary operation, chosen from the ledger state
//! 2. The opposite operation, only if the primary failed with its trigger status
//!
//! The ledger is written only after the remote service echoes the customer
//! back, and never for deletes.
//!
//! ## Key Invariants
//!
//! - Never more than one fallback per event
//! - Delete has no fallback
//! - A null resource is not a confirmation
//! - A failed ledger write does not undo a confirmed sync

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod diagnostics;
mod error;
mod http;
mod ledger;
mod reconciler;
mod remote;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{HttpConfig, ReconcilerConfig};
pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticsSink, MemorySink, NullSink, TracingSink};
pub use error::{LedgerError, LedgerResult, SyncError, SyncResult};
pub use http::{
    HttpClient, HttpMethod, HttpRemoteClient, HttpRequest, HttpResponse, LoopbackClient,
    LoopbackServer,
};
pub use ledger::{FileLedger, MemoryLedger, SyncLedger};
pub use reconciler::{Fallback, ReconcileStats, Reconciler, SyncOutcome, SyncPlan};
pub use remote::{MockRemoteClient, RecordedCall, RemoteClient, RemoteOperation, RemoteResult};
