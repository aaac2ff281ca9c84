//! Remote client abstraction for the customer resource.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use taxsync_protocol::{CustomerId, FailureSignal, RemoteResponse, SyncPayload};

/// Result of a single remote call.
pub type RemoteResult = Result<RemoteResponse, FailureSignal>;

/// An operation against the remote customer resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    /// Create the resource (`POST`).
    Create,
    /// Update the resource (`PUT`).
    Update,
    /// Delete the resource (`DELETE`).
    Delete,
}

impl RemoteOperation {
    /// Returns the operation verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteOperation::Create => "create",
            RemoteOperation::Update => "update",
            RemoteOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote client performs calls against the tax service's resources.
///
/// This trait abstracts the network layer, allowing for different implementations
/// (HTTP, loopback to an in-process service, mock for testing).
pub trait RemoteClient: Send + Sync {
    /// Creates a resource.
    fn create(&self, resource: &str, payload: &SyncPayload) -> RemoteResult;

    /// Updates the resource identified by `id`.
    fn update(&self, resource: &str, id: &CustomerId, payload: &SyncPayload) -> RemoteResult;

    /// Deletes the resource identified by `id`.
    fn delete(&self, resource: &str, id: &CustomerId) -> RemoteResult;
}

impl<R: RemoteClient + ?Sized> RemoteClient for Box<R> {
    fn create(&self, resource: &str, payload: &SyncPayload) -> RemoteResult {
        (**self).create(resource, payload)
    }

    fn update(&self, resource: &str, id: &CustomerId, payload: &SyncPayload) -> RemoteResult {
        (**self).update(resource, id, payload)
    }

    fn delete(&self, resource: &str, id: &CustomerId) -> RemoteResult {
        (**self).delete(resource, id)
    }
}

/// A call recorded by [`MockRemoteClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Operation performed.
    pub operation: RemoteOperation,
    /// Resource type.
    pub resource: String,
    /// Resource ID (update/delete).
    pub id: Option<CustomerId>,
    /// Payload sent (create/update).
    pub payload: Option<SyncPayload>,
}

/// A scripted remote client for testing.
///
/// Responses are queued per operation and consumed in order. An operation
/// with nothing queued fails without a status.
#[derive(Debug, Default)]
pub struct MockRemoteClient {
    create_responses: Mutex<VecDeque<RemoteResult>>,
    update_responses: Mutex<VecDeque<RemoteResult>>,
    delete_responses: Mutex<VecDeque<RemoteResult>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRemoteClient {
    /// Creates a mock with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for the next create.
    pub fn push_create(&self, result: RemoteResult) {
        self.create_responses.lock().push_back(result);
    }

    /// Queues a response for the next update.
    pub fn push_update(&self, result: RemoteResult) {
        self.update_responses.lock().push_back(result);
    }

    /// Queues a response for the next delete.
    pub fn push_delete(&self, result: RemoteResult) {
        self.delete_responses.lock().push_back(result);
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns the operations performed so far, in order.
    pub fn operations(&self) -> Vec<RemoteOperation> {
        self.calls.lock().iter().map(|c| c.operation).collect()
    }

    /// Clears recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn respond(
        &self,
        queue: &Mutex<VecDeque<RemoteResult>>,
        call: RecordedCall,
    ) -> RemoteResult {
        let operation = call.operation;
        self.calls.lock().push(call);
        queue.lock().pop_front().unwrap_or_else(|| {
            Err(FailureSignal::transport(format!(
                "no mock response scripted for {operation}"
            )))
        })
    }
}

impl RemoteClient for MockRemoteClient {
    fn create(&self, resource: &str, payload: &SyncPayload) -> RemoteResult {
        self.respond(
            &self.create_responses,
            RecordedCall {
                operation: RemoteOperation::Create,
                resource: resource.to_string(),
                id: None,
                payload: Some(payload.clone()),
            },
        )
    }

    fn update(&self, resource: &str, id: &CustomerId, payload: &SyncPayload) -> RemoteResult {
        self.respond(
            &self.update_responses,
            RecordedCall {
                operation: RemoteOperation::Update,
                resource: resource.to_string(),
                id: Some(id.clone()),
                payload: Some(payload.clone()),
            },
        )
    }

    fn delete(&self, resource: &str, id: &CustomerId) -> RemoteResult {
        self.respond(
            &self.delete_responses,
            RecordedCall {
                operation: RemoteOperation::Delete,
                resource: resource.to_string(),
                id: Some(id.clone()),
                payload: None,
            },
        )
    }
}
