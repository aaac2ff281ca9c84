//! In-memory customer store.

use crate::error::{ServiceError, ServiceResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use taxsync_protocol::SyncPayload;

/// A stored customer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCustomer {
    /// Latest payload received.
    pub payload: SyncPayload,
    /// Number of writes applied, starting at 1 on create.
    pub version: u64,
}

/// Customer records keyed by customer ID.
#[derive(Debug, Default)]
pub struct CustomerStore {
    customers: RwLock<BTreeMap<String, StoredCustomer>>,
}

impl CustomerStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new customer. Fails if the ID is already present.
    pub fn create(&self, payload: SyncPayload) -> ServiceResult<StoredCustomer> {
        validate(&payload)?;
        let mut customers = self.customers.write();
        if customers.contains_key(&payload.customer_id) {
            return Err(ServiceError::AlreadyExists(payload.customer_id));
        }

        let stored = StoredCustomer {
            payload,
            version: 1,
        };
        customers.insert(stored.payload.customer_id.clone(), stored.clone());
        Ok(stored)
    }

    /// Replaces an existing customer. Fails if the ID is unknown.
    pub fn update(&self, id: &str, payload: SyncPayload) -> ServiceResult<StoredCustomer> {
        validate(&payload)?;
        if payload.customer_id != id {
            return Err(ServiceError::Unprocessable(format!(
                "customer_id {} does not match path {id}",
                payload.customer_id
            )));
        }

        let mut customers = self.customers.write();
        let entry = customers
            .get_mut(id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        entry.payload = payload;
        entry.version += 1;
        Ok(entry.clone())
    }

    /// Removes a customer, returning it if it existed.
    pub fn delete(&self, id: &str) -> Option<StoredCustomer> {
        self.customers.write().remove(id)
    }

    /// Returns a customer.
    pub fn get(&self, id: &str) -> Option<StoredCustomer> {
        self.customers.read().get(id).cloned()
    }

    /// Returns true if the customer exists.
    pub fn contains(&self, id: &str) -> bool {
        self.customers.read().contains_key(id)
    }

    /// Returns all customer IDs in order.
    pub fn ids(&self) -> Vec<String> {
        self.customers.read().keys().cloned().collect()
    }

    /// Returns the number of customers.
    pub fn len(&self) -> usize {
        self.customers.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.customers.read().is_empty()
    }
}

fn validate(payload: &SyncPayload) -> ServiceResult<()> {
    if payload.customer_id.trim().is_empty() {
        return Err(ServiceError::Unprocessable("customer_id is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxsync_protocol::{map, CustomerSnapshot};

    fn payload(id: &str, name: &str) -> SyncPayload {
        map(&CustomerSnapshot::new(id, name))
    }

    #[test]
    fn create_then_duplicate() {
        let store = CustomerStore::new();
        let stored = store.create(payload("1", "Ada")).unwrap();
        assert_eq!(stored.version, 1);

        let err = store.create(payload("1", "Ada")).unwrap_err();
        assert_eq!(err, ServiceError::AlreadyExists("1".into()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_bumps_version() {
        let store = CustomerStore::new();
        store.create(payload("1", "Ada")).unwrap();

        let stored = store.update("1", payload("1", "Ada Lovelace")).unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(store.get("1").unwrap().payload.name, "Ada Lovelace");
    }

    #[test]
    fn update_unknown_is_not_found() {
        let store = CustomerStore::new();
        let err = store.update("1", payload("1", "Ada")).unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn update_with_mismatched_id_is_rejected() {
        let store = CustomerStore::new();
        store.create(payload("1", "Ada")).unwrap();
        let err = store.update("1", payload("2", "Bob")).unwrap_err();
        assert_eq!(err.status(), 422);
    }

    #[test]
    fn blank_id_is_rejected() {
        let store = CustomerStore::new();
        assert!(matches!(
            store.create(payload(" ", "Nobody")),
            Err(ServiceError::Unprocessable(_))
        ));
    }

    #[test]
    fn delete_removes() {
        let store = CustomerStore::new();
        store.create(payload("1", "Ada")).unwrap();
        store.create(payload("2", "Bob")).unwrap();
        assert_eq!(store.ids(), vec!["1", "2"]);

        assert!(store.delete("1").is_some());
        assert!(store.delete("1").is_none());
        assert!(!store.contains("1"));
        assert_eq!(store.len(), 1);
    }
}
