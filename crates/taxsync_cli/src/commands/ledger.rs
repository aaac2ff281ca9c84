//! Ledger command implementation.

use serde::Serialize;
use std::path::Path;
use taxsync_engine::FileLedger;

/// One ledger row.
#[derive(Debug, Serialize)]
pub struct LedgerEntry {
    /// Customer ID.
    pub customer_id: String,
    /// Last confirmed sync, unix seconds.
    pub last_sync: u64,
}

/// Reads the ledger rows, optionally for one customer.
pub fn entries(
    path: &Path,
    customer: Option<&str>,
) -> Result<Vec<LedgerEntry>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No ledger found at {}", path.display()).into());
    }

    let ledger = FileLedger::open(path)?;
    Ok(ledger
        .entries()
        .into_iter()
        .filter(|(id, _)| customer.map_or(true, |c| id.as_str() == c))
        .map(|(id, ts)| LedgerEntry {
            customer_id: id.to_string(),
            last_sync: ts.as_unix_secs(),
        })
        .collect())
}

/// Runs the ledger command.
pub fn run(path: &Path, customer: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let rows = entries(path, customer)?;
    if rows.is_empty() {
        if let Some(customer) = customer {
            return Err(format!("Customer #{customer} has never been synced").into());
        }
    }
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
