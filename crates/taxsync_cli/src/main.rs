//! TaxSync CLI
//!
//! Command-line tools for syncing customers with the remote tax service.
//!
//! # Commands
//!
//! - `preview` - Print the payload a customer would be synced with
//! - `sync` - Reconcile one customer event
//! - `ledger` - Show recorded sync times
//! - `version` - Show version information

mod commands;
mod input;
mod transport;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taxsync_protocol::EventKind;
use tracing_subscriber::EnvFilter;

/// TaxSync customer synchronization tools.
#[derive(Parser)]
#[command(name = "taxsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Customer event to reconcile.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum EventArg {
    Created,
    Updated,
    Deleted,
}

impl From<EventArg> for EventKind {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Created => EventKind::Created,
            EventArg::Updated => EventKind::Updated,
            EventArg::Deleted => EventKind::Deleted,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sync payload for a customer
    Preview {
        /// Customer snapshot file (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Region ID to state code map (JSON); reads the snapshot file as a raw customer record
        #[arg(short, long)]
        regions: Option<PathBuf>,
    },

    /// Reconcile one customer event with the remote service
    Sync {
        /// Event type
        #[arg(value_enum)]
        event: EventArg,

        /// Customer snapshot file (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Region ID to state code map (JSON); reads the snapshot file as a raw customer record
        #[arg(short, long)]
        regions: Option<PathBuf>,

        /// Ledger file; without it sync state lives only for this run
        #[arg(short, long)]
        ledger: Option<PathBuf>,

        /// Base URL of the remote API
        #[arg(short, long, default_value = "http://127.0.0.1:8080")]
        url: String,

        /// API token sent as a bearer token
        #[arg(short, long)]
        token: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// Run against the in-process reference service instead of the network
        #[arg(long)]
        loopback: bool,
    },

    /// Show recorded sync times
    Ledger {
        /// Ledger file
        #[arg(short, long)]
        ledger: PathBuf,

        /// Only show this customer
        #[arg(short, long)]
        customer: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Preview { snapshot, regions } => {
            commands::preview::run(&snapshot, regions.as_deref())?;
        }
        Commands::Sync {
            event,
            snapshot,
            regions,
            ledger,
            url,
            token,
            timeout,
            loopback,
        } => {
            let options = commands::sync::SyncOptions {
                kind: event.into(),
                snapshot,
                regions,
                ledger,
                url,
                token,
                timeout_secs: timeout,
                loopback,
            };
            commands::sync::run(&options)?;
        }
        Commands::Ledger { ledger, customer } => {
            commands::ledger::run(&ledger, customer.as_deref())?;
        }
        Commands::Version => {
            println!("TaxSync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Customer resource: {}", taxsync_protocol::CUSTOMERS_RESOURCE);
        }
    }

    Ok(())
}
