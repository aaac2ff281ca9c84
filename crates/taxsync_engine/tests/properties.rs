//! Property tests for the reconciliation state machine.

use proptest::prelude::*;
use taxsync_engine::{DiagnosticLevel, RemoteOperation};
use taxsync_protocol::{CustomerSnapshot, FailureSignal};
use taxsync_testkit::prelude::*;

/// Scripts the primary call to fail with `first` and the opposite call to
/// answer with `second` (a confirmation when `None`).
fn script(
    harness: &TestHarness,
    snapshot: &CustomerSnapshot,
    first: &FailureSignal,
    second: &Option<FailureSignal>,
) -> RemoteOperation {
    let id = snapshot.id.to_string();
    let fallback_result = match second {
        Some(signal) => Err(signal.clone()),
        None => confirmed(&id),
    };
    let remote = harness.remote();
    if snapshot.has_synced() {
        remote.push_update(Err(first.clone()));
        remote.push_create(fallback_result);
        RemoteOperation::Update
    } else {
        remote.push_create(Err(first.clone()));
        remote.push_update(fallback_result);
        RemoteOperation::Create
    }
}

fn trigger_for(primary: RemoteOperation) -> u16 {
    match primary {
        RemoteOperation::Create => 422,
        _ => 404,
    }
}

proptest! {
    #[test]
    fn at_most_one_fallback_per_event(
        snapshot in snapshot_strategy(),
        first in failure_strategy(),
        second in prop::option::of(failure_strategy()),
        created in any::<bool>(),
    ) {
        let harness = TestHarness::new();
        let primary = script(&harness, &snapshot, &first, &second);

        if created {
            harness.created(&snapshot);
        } else {
            harness.updated(&snapshot);
        }

        let operations = harness.remote().operations();
        prop_assert!(!operations.is_empty() && operations.len() <= 2);
        prop_assert_eq!(operations[0], primary);

        let triggered = first.status_code == Some(trigger_for(primary));
        prop_assert_eq!(operations.len() == 2, triggered);
        if triggered {
            prop_assert_ne!(operations[1], primary);
        }

        let fallbacks = harness
            .sink
            .levels()
            .into_iter()
            .filter(|level| *level == DiagnosticLevel::Fallback)
            .count();
        prop_assert_eq!(fallbacks, usize::from(triggered));
    }

    #[test]
    fn ledger_written_only_when_confirmed(
        snapshot in snapshot_strategy(),
        first in failure_strategy(),
        second in prop::option::of(failure_strategy()),
    ) {
        let harness = TestHarness::new();
        let primary = script(&harness, &snapshot, &first, &second);

        let outcome = harness.updated(&snapshot);

        let expect_confirmed =
            first.status_code == Some(trigger_for(primary)) && second.is_none();
        prop_assert_eq!(outcome.confirmed, expect_confirmed);
        prop_assert_eq!(harness.ledger().write_count(), u64::from(outcome.confirmed));
        prop_assert_eq!(outcome.timestamp_to_persist.is_some(), outcome.confirmed);
        if !outcome.confirmed {
            prop_assert_eq!(
                harness.sink.levels().last().copied(),
                Some(DiagnosticLevel::Error)
            );
        }
    }

    #[test]
    fn deletes_never_fall_back_or_write(
        snapshot in snapshot_strategy(),
        failure in prop::option::of(failure_strategy()),
    ) {
        let harness = TestHarness::new();
        let id = snapshot.id.to_string();
        harness.remote().push_delete(match failure {
            Some(signal) => Err(signal),
            None => confirmed(&id),
        });

        harness.deleted(&id);

        prop_assert_eq!(harness.remote().operations(), vec![RemoteOperation::Delete]);
        prop_assert_eq!(harness.ledger().write_count(), 0);
    }
}
