//! Customer lifecycle events.

use crate::snapshot::{CustomerId, CustomerSnapshot};
use std::fmt;

/// A customer lifecycle event that triggers reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The customer was created locally.
    Created(CustomerSnapshot),
    /// The customer was updated locally.
    Updated(CustomerSnapshot),
    /// The customer is being deleted locally.
    Deleted(CustomerId),
}

/// Tag of a [`SyncEvent`] without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Created event.
    Created,
    /// Updated event.
    Updated,
    /// Deleted event.
    Deleted,
}

impl SyncEvent {
    /// Returns the event tag.
    pub fn kind(&self) -> EventKind {
        match self {
            SyncEvent::Created(_) => EventKind::Created,
            SyncEvent::Updated(_) => EventKind::Updated,
            SyncEvent::Deleted(_) => EventKind::Deleted,
        }
    }

    /// Returns the customer the event is about.
    pub fn customer_id(&self) -> &CustomerId {
        match self {
            SyncEvent::Created(snapshot) | SyncEvent::Updated(snapshot) => &snapshot.id,
            SyncEvent::Deleted(id) => id,
        }
    }

    /// Returns the snapshot for created/updated events.
    pub fn snapshot(&self) -> Option<&CustomerSnapshot> {
        match self {
            SyncEvent::Created(snapshot) | SyncEvent::Updated(snapshot) => Some(snapshot),
            SyncEvent::Deleted(_) => None,
        }
    }
}

impl EventKind {
    /// Returns the event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Updated => "updated",
            EventKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_accessors() {
        let snapshot = CustomerSnapshot::new("3", "Grace Hopper");
        let created = SyncEvent::Created(snapshot.clone());
        assert_eq!(created.kind(), EventKind::Created);
        assert_eq!(created.customer_id().as_str(), "3");
        assert_eq!(created.snapshot(), Some(&snapshot));

        let deleted = SyncEvent::Deleted(CustomerId::new("3"));
        assert_eq!(deleted.kind(), EventKind::Deleted);
        assert!(deleted.snapshot().is_none());
        assert_eq!(deleted.kind().to_string(), "deleted");
    }
}
