//! Preview command implementation.

use crate::input::load_snapshot;
use std::path::Path;
use taxsync_protocol::map;

/// Runs the preview command.
pub fn run(snapshot: &Path, regions: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(snapshot, regions)?;
    let payload = map(&snapshot);
    println!("{}", serde_json::to_string_pretty(&payload.to_value()?)?);
    Ok(())
}
