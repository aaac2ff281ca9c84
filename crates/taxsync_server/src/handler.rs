//! Request handlers for the customer endpoints.

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{CustomerStore, StoredCustomer};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use taxsync_protocol::SyncPayload;

/// A response produced by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    /// HTTP status.
    pub status: u16,
    /// JSON body.
    pub body: Vec<u8>,
}

impl ServiceResponse {
    /// Creates a JSON response.
    pub fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            body: value.to_string().into_bytes(),
        }
    }

    /// Creates the response for an error.
    pub fn error(error: &ServiceError) -> Self {
        Self {
            status: error.status(),
            body: error.to_body(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as text.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Shared state for request handling.
pub struct HandlerContext {
    /// Service configuration.
    pub config: ServiceConfig,
    /// Customer store (shared across handlers).
    pub store: Arc<CustomerStore>,
    echo_resource: AtomicBool,
    faults: Mutex<VecDeque<ServiceError>>,
    requests: AtomicU64,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServiceConfig, store: Arc<CustomerStore>) -> Self {
        Self {
            echo_resource: AtomicBool::new(config.echo_resource),
            config,
            store,
            faults: Mutex::new(VecDeque::new()),
            requests: AtomicU64::new(0),
        }
    }

    /// Queues a failure returned by the next request instead of handling it.
    pub fn inject_fault(&self, error: ServiceError) {
        self.faults.lock().push_back(error);
    }

    /// Sets whether successful responses echo the customer.
    pub fn set_echo_resource(&self, echo: bool) {
        self.echo_resource.store(echo, Ordering::SeqCst);
    }

    /// Returns the number of requests received.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    fn take_fault(&self) -> Option<ServiceError> {
        self.faults.lock().pop_front()
    }
}

/// Handler for customer requests.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Routes a raw request to the matching handler.
    ///
    /// Supported routes are `POST /{resource}`, `PUT /{resource}/{id}` and
    /// `DELETE /{resource}/{id}`. The id is percent-decoded. A trailing query
    /// string is ignored.
    pub fn route(&self, method: &str, path: &str, body: Option<&[u8]>) -> ServiceResponse {
        self.context.requests.fetch_add(1, Ordering::SeqCst);

        let result = match self.context.take_fault() {
            Some(fault) => Err(fault),
            None => self.dispatch(method, path, body),
        };

        match result {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%method, %path, status = error.status(), error = %error, "request rejected");
                ServiceResponse::error(&error)
            }
        }
    }

    fn dispatch(
        &self,
        method: &str,
        path: &str,
        body: Option<&[u8]>,
    ) -> ServiceResult<ServiceResponse> {
        let path = path.split('?').next().unwrap_or_default();
        let mut segments = path.trim_matches('/').split('/');
        let resource = segments.next().unwrap_or_default();
        let id = segments.next();

        if resource != self.context.config.resource || segments.next().is_some() {
            return Err(ServiceError::InvalidRequest(format!("no route for {path}")));
        }

        // Ids arrive as one percent-encoded segment.
        let id = id
            .map(|raw| {
                urlencoding::decode(raw).map_err(|e| {
                    ServiceError::InvalidRequest(format!("bad customer id {raw}: {e}"))
                })
            })
            .transpose()?;

        match (method.to_ascii_uppercase().as_str(), id.as_deref()) {
            ("POST", None) => self.handle_create(self.decode(body)?),
            ("PUT", Some(id)) => self.handle_update(id, self.decode(body)?),
            ("DELETE", Some(id)) => self.handle_delete(id),
            _ => Err(ServiceError::InvalidRequest(format!(
                "{method} not allowed on {path}"
            ))),
        }
    }

    /// Handles a create request.
    pub fn handle_create(&self, payload: SyncPayload) -> ServiceResult<ServiceResponse> {
        let stored = self.context.store.create(payload)?;
        tracing::debug!(customer_id = %stored.payload.customer_id, "customer created");
        Ok(self.respond(201, Some(&stored)))
    }

    /// Handles an update request.
    pub fn handle_update(&self, id: &str, payload: SyncPayload) -> ServiceResult<ServiceResponse> {
        let stored = self.context.store.update(id, payload)?;
        tracing::debug!(customer_id = %id, version = stored.version, "customer updated");
        Ok(self.respond(200, Some(&stored)))
    }

    /// Handles a delete request.
    pub fn handle_delete(&self, id: &str) -> ServiceResult<ServiceResponse> {
        match self.context.store.delete(id) {
            Some(stored) => {
                tracing::debug!(customer_id = %id, "customer deleted");
                Ok(self.respond(200, Some(&stored)))
            }
            None if self.context.config.strict_delete => {
                Err(ServiceError::NotFound(id.to_string()))
            }
            None => Ok(self.respond(200, None)),
        }
    }

    fn decode(&self, body: Option<&[u8]>) -> ServiceResult<SyncPayload> {
        let body = body.ok_or_else(|| ServiceError::InvalidRequest("missing body".into()))?;
        if body.len() > self.context.config.max_body_bytes {
            return Err(ServiceError::InvalidRequest(format!(
                "body too large: {} > {}",
                body.len(),
                self.context.config.max_body_bytes
            )));
        }
        serde_json::from_slice(body).map_err(|e| ServiceError::Unprocessable(e.to_string()))
    }

    fn respond(&self, status: u16, stored: Option<&StoredCustomer>) -> ServiceResponse {
        let customer = match stored {
            Some(stored) if self.context.echo_resource.load(Ordering::SeqCst) => {
                serde_json::to_value(&stored.payload).unwrap_or(Value::Null)
            }
            _ => Value::Null,
        };
        ServiceResponse::json(status, &json!({ "customer": customer }))
    }
}
