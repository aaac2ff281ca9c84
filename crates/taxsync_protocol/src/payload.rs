//! Record mapper: customer snapshot to sync payload.

use crate::error::ProtocolResult;
use crate::snapshot::{CustomerSnapshot, ExemptRegion};
use serde::{Deserialize, Serialize};

/// The wire record sent to the remote customer resource.
///
/// Location fields are always present. An absent value is sent as an
/// empty string, never as `null`, because the remote API treats the two
/// differently. Field order is fixed so equal payloads serialize to
/// identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Customer identifier.
    pub customer_id: String,
    /// Exemption category, or empty.
    pub exemption_type: String,
    /// Display name.
    pub name: String,
    /// Full street.
    pub street: String,
    /// City.
    pub city: String,
    /// State code.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Country, only sent when the customer has an address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Exempt regions, only sent when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exempt_regions: Vec<ExemptRegion>,
}

impl SyncPayload {
    /// Encodes the payload as JSON bytes.
    pub fn to_json(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Encodes the payload as a JSON value.
    pub fn to_value(&self) -> ProtocolResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl From<&CustomerSnapshot> for SyncPayload {
    fn from(snapshot: &CustomerSnapshot) -> Self {
        map(snapshot)
    }
}

/// Builds the sync payload for a snapshot.
///
/// Pure and total: the payload depends on nothing but the snapshot.
pub fn map(snapshot: &CustomerSnapshot) -> SyncPayload {
    let field = |value: Option<&String>| value.cloned().unwrap_or_default();
    let address = snapshot.address.as_ref();

    SyncPayload {
        customer_id: snapshot.id.to_string(),
        exemption_type: snapshot
            .exemption_type
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
        name: snapshot.display_name.clone(),
        street: field(address.and_then(|a| a.street_full.as_ref())),
        city: field(address.and_then(|a| a.city.as_ref())),
        state: field(address.and_then(|a| a.state_code.as_ref())),
        zip: field(address.and_then(|a| a.postal_code.as_ref())),
        country: address.map(|a| field(a.country.as_ref())),
        exempt_regions: snapshot.exempt_regions.iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Address, ExemptionType, SyncTimestamp};
    use proptest::prelude::*;

    fn full_address() -> Address {
        Address {
            country: Some("US".into()),
            state_code: Some("CA".into()),
            postal_code: Some("94107".into()),
            city: Some("San Francisco".into()),
            street_full: Some("600 Montgomery St\nFloor 4".into()),
        }
    }

    #[test]
    fn maps_full_snapshot() {
        let snapshot = CustomerSnapshot::new("123", "Ada Lovelace")
            .with_exemption_type(ExemptionType::Wholesale)
            .with_address(full_address())
            .with_exempt_region(ExemptRegion::new("US", "NY"));

        let payload = map(&snapshot);
        assert_eq!(payload.customer_id, "123");
        assert_eq!(payload.exemption_type, "wholesale");
        assert_eq!(payload.name, "Ada Lovelace");
        assert_eq!(payload.street, "600 Montgomery St\nFloor 4");
        assert_eq!(payload.city, "San Francisco");
        assert_eq!(payload.state, "CA");
        assert_eq!(payload.zip, "94107");
        assert_eq!(payload.country.as_deref(), Some("US"));
        assert_eq!(payload.exempt_regions, vec![ExemptRegion::new("US", "NY")]);
    }

    #[test]
    fn address_absent_yields_empty_strings() {
        let payload = map(&CustomerSnapshot::new("9", "No Address"));
        let value = payload.to_value().unwrap();

        for key in ["street", "city", "state", "zip", "exemption_type"] {
            assert_eq!(value[key], serde_json::json!(""), "field {key}");
        }
        assert!(value.get("country").is_none());
        assert!(value.get("exempt_regions").is_none());
    }

    #[test]
    fn partial_address_defaults_missing_fields() {
        let snapshot = CustomerSnapshot::new("5", "Partial").with_address(Address {
            city: Some("Austin".into()),
            ..Address::default()
        });

        let value = map(&snapshot).to_value().unwrap();
        assert_eq!(value["city"], "Austin");
        assert_eq!(value["state"], "");
        assert_eq!(value["country"], "");
    }

    #[test]
    fn sync_history_does_not_leak_into_payload() {
        let fresh = CustomerSnapshot::new("1", "Same");
        let synced = fresh.clone().with_last_sync(SyncTimestamp::from_unix_secs(99));
        assert_eq!(map(&fresh), map(&synced));
    }

    #[test]
    fn wire_key_order_is_stable() {
        let json = String::from_utf8(map(&CustomerSnapshot::new("1", "A")).to_json().unwrap())
            .unwrap();
        assert_eq!(
            json,
            r#"{"customer_id":"1","exemption_type":"","name":"A","street":"","city":"","state":"","zip":""}"#
        );
    }

    fn snapshot_strategy() -> impl Strategy<Value = CustomerSnapshot> {
        (
            "[a-z0-9]{1,12}",
            ".{0,24}",
            prop::option::of(prop::sample::select(vec![
                ExemptionType::Wholesale,
                ExemptionType::Government,
                ExemptionType::Other,
                ExemptionType::NonExempt,
            ])),
            prop::collection::btree_set("[A-Z]{2}", 0..4),
            prop::option::of((
                prop::option::of("[A-Z]{2}"),
                prop::option::of("[0-9]{5}"),
                prop::option::of("[a-zA-Z ]{0,16}"),
            )),
        )
            .prop_map(|(id, name, exemption, states, address)| {
                let mut snapshot = CustomerSnapshot::new(id, name);
                snapshot.exemption_type = exemption;
                for state in states {
                    snapshot = snapshot.with_exempt_region(ExemptRegion::new("US", state));
                }
                snapshot.address = address.map(|(state_code, postal_code, city)| Address {
                    country: Some("US".into()),
                    state_code,
                    postal_code,
                    city,
                    street_full: None,
                });
                snapshot
            })
    }

    proptest! {
        #[test]
        fn mapping_is_pure(snapshot in snapshot_strategy()) {
            let first = map(&snapshot).to_json().unwrap();
            let second = map(&snapshot.clone()).to_json().unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn location_fields_never_null(snapshot in snapshot_strategy()) {
            let value = map(&snapshot).to_value().unwrap();
            for key in ["street", "city", "state", "zip"] {
                prop_assert!(value[key].is_string());
            }
        }
    }
}
