//! The reference customer service.

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::handler::{HandlerContext, RequestHandler, ServiceResponse};
use crate::store::{CustomerStore, StoredCustomer};
use std::sync::Arc;

/// An in-process customer service with the remote tax service's contract.
///
/// Creating an existing customer answers 422, updating or deleting an
/// unknown one answers 404, and every success carries
/// `{"customer": <record or null>}`.
///
/// # Example
///
/// ```
/// use taxsync_server::{ServiceConfig, TaxService};
///
/// let service = TaxService::new(ServiceConfig::default());
/// let body = br#"{"customer_id":"1","exemption_type":"","name":"A","street":"","city":"","state":"","zip":""}"#;
///
/// let response = service.handle("POST", "/customers", Some(&body[..]));
/// assert_eq!(response.status, 201);
/// assert_eq!(service.customer_count(), 1);
/// ```
pub struct TaxService {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
}

impl TaxService {
    /// Creates a service with an empty store.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_store(config, Arc::new(CustomerStore::new()))
    }

    /// Creates a service over an existing store.
    pub fn with_store(config: ServiceConfig, store: Arc<CustomerStore>) -> Self {
        let context = Arc::new(HandlerContext::new(config, store));
        let handler = RequestHandler::new(Arc::clone(&context));

        Self { handler, context }
    }

    /// Handles one request.
    pub fn handle(&self, method: &str, path: &str, body: Option<&[u8]>) -> ServiceResponse {
        self.handler.route(method, path, body)
    }

    /// Makes the next request fail with `status` and `message`.
    pub fn fail_next(&self, status: u16, message: impl Into<String>) {
        self.context.inject_fault(ServiceError::Injected {
            status,
            message: message.into(),
        });
    }

    /// Sets whether successful responses echo the customer.
    pub fn set_echo_resource(&self, echo: bool) {
        self.context.set_echo_resource(echo);
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<CustomerStore> {
        &self.context.store
    }

    /// Returns a stored customer.
    pub fn customer(&self, id: &str) -> Option<StoredCustomer> {
        self.context.store.get(id)
    }

    /// Returns the number of stored customers.
    pub fn customer_count(&self) -> usize {
        self.context.store.len()
    }

    /// Returns the number of requests received.
    pub fn request_count(&self) -> u64 {
        self.context.request_count()
    }
}

impl Default for TaxService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}
