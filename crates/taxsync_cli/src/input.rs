//! Loading customer snapshots from files.

use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;
use taxsync_protocol::{
    CustomerSnapshot, LocalCustomer, SnapshotBuilder, StaticRegionResolver,
};

/// Loads a snapshot.
///
/// Without a region map the file holds a [`CustomerSnapshot`]. With one it
/// holds a raw [`LocalCustomer`] record whose region IDs are resolved
/// through the map.
pub fn load_snapshot(
    path: &Path,
    regions: Option<&Path>,
) -> Result<CustomerSnapshot, Box<dyn Error>> {
    let bytes = fs::read(path).map_err(|e| format!("Cannot read {}: {e}", path.display()))?;

    match regions {
        None => Ok(serde_json::from_slice(&bytes)?),
        Some(regions) => {
            let customer: LocalCustomer = serde_json::from_slice(&bytes)?;
            let resolver = load_regions(regions)?;
            Ok(SnapshotBuilder::new(&resolver).build(&customer))
        }
    }
}

fn load_regions(path: &Path) -> Result<StaticRegionResolver, Box<dyn Error>> {
    let bytes = fs::read(path).map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
    let codes: HashMap<String, String> = serde_json::from_slice(&bytes)?;
    tracing::debug!(regions = codes.len(), "loaded region map");
    Ok(codes.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use taxsync_protocol::{ExemptRegion, ExemptionType};

    #[test]
    fn loads_plain_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("customer.json");
        fs::write(
            &path,
            r#"{"id":"7","display_name":"Ada Lovelace","exemption_type":"government"}"#,
        )
        .unwrap();

        let snapshot = load_snapshot(&path, None).unwrap();
        assert_eq!(snapshot.id.as_str(), "7");
        assert_eq!(snapshot.exemption_type, Some(ExemptionType::Government));
        assert!(snapshot.last_sync.is_none());
    }

    #[test]
    fn resolves_raw_customer_regions() {
        let dir = TempDir::new().unwrap();
        let customer = dir.path().join("customer.json");
        let regions = dir.path().join("regions.json");
        fs::write(
            &customer,
            r#"{"id":"8","first_name":"Grace","last_name":"Hopper","region_ids":["12","99"]}"#,
        )
        .unwrap();
        fs::write(&regions, r#"{"12":"CA"}"#).unwrap();

        let snapshot = load_snapshot(&customer, Some(&regions)).unwrap();
        assert_eq!(snapshot.display_name, "Grace Hopper");
        assert_eq!(
            snapshot.exempt_regions.into_iter().collect::<Vec<_>>(),
            vec![ExemptRegion::new("US", "CA")]
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_snapshot(&dir.path().join("nope.json"), None).is_err());
    }
}
