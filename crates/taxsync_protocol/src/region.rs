//! Region resolution and snapshot assembly from host customer records.

use crate::snapshot::{Address, CustomerId, CustomerSnapshot, ExemptRegion, SyncTimestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Country used for regions resolved from local region identifiers.
const EXEMPT_REGION_COUNTRY: &str = "US";

/// Resolves a local region identifier to a canonical state code.
pub trait RegionResolver: Send + Sync {
    /// Returns the state code for `region_id`, or `None` if it is unknown.
    fn resolve(&self, region_id: &str) -> Option<String>;
}

/// A map-backed region resolver.
#[derive(Debug, Clone, Default)]
pub struct StaticRegionResolver {
    codes: HashMap<String, String>,
}

impl StaticRegionResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a region.
    pub fn with_region(mut self, region_id: impl Into<String>, code: impl Into<String>) -> Self {
        self.codes.insert(region_id.into(), code.into());
        self
    }

    /// Returns the number of known regions.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if no regions are registered.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StaticRegionResolver
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            codes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl RegionResolver for StaticRegionResolver {
    fn resolve(&self, region_id: &str) -> Option<String> {
        self.codes.get(region_id.trim()).cloned()
    }
}

/// A customer record as the host application stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCustomer {
    /// Customer identifier.
    pub id: String,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Raw exemption type attribute.
    #[serde(default)]
    pub exemption_type: Option<String>,
    /// Local identifiers of the exempt regions.
    #[serde(default)]
    pub region_ids: Vec<String>,
    /// Default shipping address.
    #[serde(default)]
    pub default_shipping_address: Option<Address>,
    /// All addresses on file.
    #[serde(default)]
    pub addresses: Vec<Address>,
    /// Last confirmed sync.
    #[serde(default)]
    pub last_sync: Option<SyncTimestamp>,
}

/// Assembles [`CustomerSnapshot`]s from [`LocalCustomer`] records.
pub struct SnapshotBuilder<'a> {
    resolver: &'a dyn RegionResolver,
}

impl<'a> SnapshotBuilder<'a> {
    /// Creates a builder using the given region resolver.
    pub fn new(resolver: &'a dyn RegionResolver) -> Self {
        Self { resolver }
    }

    /// Builds the snapshot for a customer.
    ///
    /// The display name is first and last name joined by a space, trimmed so
    /// a missing part leaves no stray space. Unresolvable regions and unknown
    /// exemption types are dropped with a warning; they never abort the sync.
    pub fn build(&self, customer: &LocalCustomer) -> CustomerSnapshot {
        let display_name = format!("{} {}", customer.first_name, customer.last_name)
            .trim()
            .to_string();

        let exemption_type = customer
            .exemption_type
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| match raw.parse() {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::warn!(customer_id = %customer.id, error = %e, "ignoring exemption type");
                    None
                }
            });

        let address = customer
            .default_shipping_address
            .clone()
            .or_else(|| customer.addresses.first().cloned());

        CustomerSnapshot {
            id: CustomerId::new(customer.id.clone()),
            exemption_type,
            display_name,
            exempt_regions: self.resolve_regions(&customer.id, &customer.region_ids),
            address,
            last_sync: customer.last_sync,
        }
    }

    fn resolve_regions(&self, customer_id: &str, region_ids: &[String]) -> BTreeSet<ExemptRegion> {
        region_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .filter_map(|id| match self.resolver.resolve(id) {
                Some(code) => Some(ExemptRegion::new(EXEMPT_REGION_COUNTRY, code)),
                None => {
                    tracing::warn!(customer_id, region_id = id, "skipping unresolved exempt region");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ExemptionType;

    fn resolver() -> StaticRegionResolver {
        [("12", "CA"), ("43", "NY")].into_iter().collect()
    }

    fn address(city: &str) -> Address {
        Address {
            city: Some(city.into()),
            ..Address::default()
        }
    }

    #[test]
    fn builds_display_name_and_exemption() {
        let customer = LocalCustomer {
            id: "8".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            exemption_type: Some("government".into()),
            ..LocalCustomer::default()
        };

        let resolver = resolver();
        let snapshot = SnapshotBuilder::new(&resolver).build(&customer);
        assert_eq!(snapshot.display_name, "Ada Lovelace");
        assert_eq!(snapshot.exemption_type, Some(ExemptionType::Government));
        assert!(snapshot.address.is_none());
    }

    #[test]
    fn missing_name_part_leaves_no_stray_space() {
        let resolver = StaticRegionResolver::new();
        let builder = SnapshotBuilder::new(&resolver);

        let first_only = LocalCustomer {
            id: "8".into(),
            first_name: "Grace".into(),
            ..LocalCustomer::default()
        };
        assert_eq!(builder.build(&first_only).display_name, "Grace");

        let last_only = LocalCustomer {
            id: "9".into(),
            last_name: "Hopper".into(),
            ..LocalCustomer::default()
        };
        assert_eq!(builder.build(&last_only).display_name, "Hopper");
    }

    #[test]
    fn prefers_default_shipping_address() {
        let customer = LocalCustomer {
            id: "8".into(),
            default_shipping_address: Some(address("Boston")),
            addresses: vec![address("Denver")],
            ..LocalCustomer::default()
        };

        let resolver = resolver();
        let snapshot = SnapshotBuilder::new(&resolver).build(&customer);
        assert_eq!(snapshot.address.unwrap().city.as_deref(), Some("Boston"));
    }

    #[test]
    fn falls_back_to_first_address() {
        let customer = LocalCustomer {
            id: "8".into(),
            addresses: vec![address("Denver"), address("Reno")],
            ..LocalCustomer::default()
        };

        let resolver = resolver();
        let snapshot = SnapshotBuilder::new(&resolver).build(&customer);
        assert_eq!(snapshot.address.unwrap().city.as_deref(), Some("Denver"));
    }

    #[test]
    fn unresolved_regions_are_skipped() {
        let customer = LocalCustomer {
            id: "8".into(),
            region_ids: vec!["12".into(), "999".into(), " 43 ".into(), "".into()],
            ..LocalCustomer::default()
        };

        let resolver = resolver();
        let snapshot = SnapshotBuilder::new(&resolver).build(&customer);
        let states: Vec<_> = snapshot
            .exempt_regions
            .iter()
            .map(|r| (r.country.as_str(), r.state.as_str()))
            .collect();
        assert_eq!(states, vec![("US", "CA"), ("US", "NY")]);
    }

    #[test]
    fn unknown_exemption_type_is_dropped() {
        let customer = LocalCustomer {
            id: "8".into(),
            exemption_type: Some("charity".into()),
            ..LocalCustomer::default()
        };

        let resolver = StaticRegionResolver::new();
        let snapshot = SnapshotBuilder::new(&resolver).build(&customer);
        assert!(snapshot.exemption_type.is_none());
    }

    #[test]
    fn sync_history_is_carried_over() {
        let customer = LocalCustomer {
            id: "8".into(),
            last_sync: Some(SyncTimestamp::from_unix_secs(1_600_000_000)),
            ..LocalCustomer::default()
        };

        let resolver = StaticRegionResolver::new();
        assert!(SnapshotBuilder::new(&resolver).build(&customer).has_synced());
    }
}
