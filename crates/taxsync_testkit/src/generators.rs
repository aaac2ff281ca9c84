//! Property-based test generators using proptest.
//!
//! Provides strategies for customer snapshots and remote failures.

use proptest::prelude::*;
use taxsync_protocol::{
    Address, CustomerSnapshot, ExemptRegion, ExemptionType, FailureSignal, SyncTimestamp,
};

/// Strategy for customer IDs.
pub fn customer_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[1-9][0-9]{0,7}").expect("Invalid regex")
}

/// Strategy for exemption types, including absent.
pub fn exemption_type_strategy() -> impl Strategy<Value = Option<ExemptionType>> {
    prop::option::of(prop_oneof![
        Just(ExemptionType::Wholesale),
        Just(ExemptionType::Government),
        Just(ExemptionType::Other),
        Just(ExemptionType::NonExempt),
    ])
}

/// Strategy for US state codes.
pub fn state_code_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["CA", "NY", "TX", "WA", "FL", "IL", "OR", "NV"])
        .prop_map(str::to_string)
}

/// Strategy for addresses with any subset of fields present.
pub fn address_strategy() -> impl Strategy<Value = Address> {
    (
        prop::option::of(Just("US".to_string())),
        prop::option::of(state_code_strategy()),
        prop::option::of(prop::string::string_regex("[0-9]{5}").expect("Invalid regex")),
        prop::option::of(prop::string::string_regex("[A-Z][a-z]{2,12}").expect("Invalid regex")),
        prop::option::of(
            prop::string::string_regex("[1-9][0-9]{0,3} [A-Z][a-z]{2,10} St").expect("Invalid regex"),
        ),
    )
        .prop_map(|(country, state_code, postal_code, city, street_full)| Address {
            country,
            state_code,
            postal_code,
            city,
            street_full,
        })
}

/// Strategy for customer snapshots.
pub fn snapshot_strategy() -> impl Strategy<Value = CustomerSnapshot> {
    (
        customer_id_strategy(),
        prop::string::string_regex("[A-Z][a-z]{1,8} [A-Z][a-z]{1,10}").expect("Invalid regex"),
        exemption_type_strategy(),
        prop::option::of(address_strategy()),
        prop::collection::btree_set(state_code_strategy(), 0..4),
        prop::option::of(1u64..2_000_000_000),
    )
        .prop_map(|(id, name, exemption, address, states, last_sync)| {
            let mut snapshot = CustomerSnapshot::new(id, name);
            snapshot.exemption_type = exemption;
            snapshot.address = address;
            snapshot.exempt_regions = states
                .into_iter()
                .map(|state| ExemptRegion::new("US", state))
                .collect();
            snapshot.last_sync = last_sync.map(SyncTimestamp::from_unix_secs);
            snapshot
        })
}

/// Strategy for remote failures, with or without a status.
pub fn failure_strategy() -> impl Strategy<Value = FailureSignal> {
    prop_oneof![
        3 => prop::sample::select(vec![400u16, 401, 403, 404, 409, 422, 429, 500, 502, 503])
            .prop_map(|status| FailureSignal::new(status, format!("remote said {status}"))),
        1 => Just(FailureSignal::transport("connection reset")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxsync_protocol::map;

    proptest! {
        #[test]
        fn generated_snapshots_map_cleanly(snapshot in snapshot_strategy()) {
            let payload = map(&snapshot);
            prop_assert_eq!(payload.customer_id, snapshot.id.to_string());
            prop_assert_eq!(payload.exempt_regions.len(), snapshot.exempt_regions.len());
        }

        #[test]
        fn generated_ids_are_non_empty(id in customer_id_strategy()) {
            prop_assert!(!id.is_empty());
        }
    }
}
