//! Sync command implementation.

use crate::input::load_snapshot;
use crate::transport::{LocalService, ReqwestClient};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taxsync_engine::{
    FileLedger, HttpConfig, HttpRemoteClient, LoopbackClient, MemoryLedger, Reconciler,
    ReconcilerConfig, RemoteClient, SyncLedger, SyncOutcome, TracingSink,
};
use taxsync_protocol::{EventKind, SyncEvent};
use taxsync_server::TaxService;

/// Options of the sync command.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Event to reconcile.
    pub kind: EventKind,
    /// Snapshot file.
    pub snapshot: PathBuf,
    /// Optional region map.
    pub regions: Option<PathBuf>,
    /// Optional ledger file.
    pub ledger: Option<PathBuf>,
    /// Remote base URL.
    pub url: String,
    /// Bearer token.
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Use the in-process reference service.
    pub loopback: bool,
}

/// Result printed by the sync command.
#[derive(Debug, Serialize)]
pub struct SyncReport {
    /// Event reconciled.
    pub event: &'static str,
    /// Customer ID.
    pub customer_id: String,
    /// Outcome of the reconciliation.
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

/// Reconciles one event and returns the report.
pub fn execute(options: &SyncOptions) -> Result<SyncReport, Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(&options.snapshot, options.regions.as_deref())?;
    let event = match options.kind {
        EventKind::Created => SyncEvent::Created(snapshot),
        EventKind::Updated => SyncEvent::Updated(snapshot),
        EventKind::Deleted => SyncEvent::Deleted(snapshot.id),
    };

    let config = ReconcilerConfig::default();
    config.validate()?;

    let remote = remote_client(options)?;
    let ledger: Box<dyn SyncLedger> = match &options.ledger {
        Some(path) => Box::new(FileLedger::open(path)?),
        None => Box::new(MemoryLedger::new()),
    };

    let reconciler = Reconciler::new(config, remote, ledger);
    let plan = reconciler.plan(&event);
    tracing::debug!(primary = %plan.primary, fallback = ?plan.fallback, "planned sync");

    let outcome = reconciler.handle(&event, &TracingSink);
    Ok(SyncReport {
        event: event.kind().as_str(),
        customer_id: event.customer_id().to_string(),
        outcome,
    })
}

/// Runs the sync command.
pub fn run(options: &SyncOptions) -> Result<(), Box<dyn std::error::Error>> {
    let report = execute(options)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.outcome.confirmed {
        return Err(format!("Customer #{} was not confirmed", report.customer_id).into());
    }
    Ok(())
}

fn remote_client(options: &SyncOptions) -> Result<Box<dyn RemoteClient>, Box<dyn std::error::Error>> {
    if options.loopback {
        let service = Arc::new(TaxService::default());
        let client = LoopbackClient::new(LocalService(service));
        return Ok(Box::new(HttpRemoteClient::new(
            HttpConfig::new("memory://taxsync"),
            client,
        )));
    }

    let config = HttpConfig::new(options.url.clone())
        .with_timeout(Duration::from_secs(options.timeout_secs));
    let client = ReqwestClient::new(&config, options.token.clone())?;
    Ok(Box::new(HttpRemoteClient::new(config, client)))
}
