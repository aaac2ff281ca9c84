//! HTTP remote client implementation.
//!
//! This module maps the remote client operations onto the tax service's REST
//! endpoints. The actual HTTP client is abstracted via a trait to allow
//! different implementations (reqwest, ureq, or an in-process loopback).

use crate::config::HttpConfig;
use crate::remote::{RemoteClient, RemoteOperation, RemoteResult};
use parking_lot::RwLock;
use std::fmt;
use taxsync_protocol::{CustomerId, FailureSignal, RemoteResponse, SyncPayload};

/// HTTP method used by the remote client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RemoteOperation> for HttpMethod {
    fn from(operation: RemoteOperation) -> Self {
        match operation {
            RemoteOperation::Create => HttpMethod::Post,
            RemoteOperation::Update => HttpMethod::Put,
            RemoteOperation::Delete => HttpMethod::Delete,
        }
    }
}

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// JSON body.
    pub body: Option<Vec<u8>>,
}

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. An `Err`
/// means no HTTP response was received; if its message is a JSON error body
/// carrying a `status`, that status is still honored.
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns the response.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String>;
}

/// Remote client speaking JSON over HTTP.
pub struct HttpRemoteClient<C: HttpClient> {
    config: HttpConfig,
    client: C,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpRemoteClient<C> {
    /// Creates a new HTTP remote client.
    pub fn new(config: HttpConfig, client: C) -> Self {
        Self {
            config,
            client,
            last_error: RwLock::new(None),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Returns the message of the last failed call.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn execute(
        &self,
        operation: RemoteOperation,
        url: String,
        payload: Option<&SyncPayload>,
    ) -> RemoteResult {
        let body = payload
            .map(|p| p.to_json())
            .transpose()
            .map_err(|e| self.fail(FailureSignal::transport(format!("failed to encode payload: {e}"))))?;

        let request = HttpRequest {
            method: operation.into(),
            url,
            body,
        };
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let response = self
            .client
            .send(request)
            .map_err(|e| self.fail(FailureSignal::from_message(e)))?;

        if !response.is_success() {
            tracing::debug!(status = response.status, "remote rejected request");
            return Err(self.fail(FailureSignal::new(response.status, response.body_text())));
        }

        let decoded = RemoteResponse::from_json(&response.body).map_err(|e| {
            self.fail(FailureSignal::transport(format!(
                "failed to decode response: {e}"
            )))
        })?;

        *self.last_error.write() = None;
        if !decoded.is_confirmed() {
            tracing::debug!(status = response.status, "remote accepted request without a resource");
        }
        Ok(decoded)
    }

    fn fail(&self, failure: FailureSignal) -> FailureSignal {
        *self.last_error.write() = Some(failure.to_string());
        failure
    }
}

impl<C: HttpClient> RemoteClient for HttpRemoteClient<C> {
    fn create(&self, resource: &str, payload: &SyncPayload) -> RemoteResult {
        let url = self.config.collection_url(resource);
        self.execute(RemoteOperation::Create, url, Some(payload))
    }

    fn update(&self, resource: &str, id: &CustomerId, payload: &SyncPayload) -> RemoteResult {
        let url = self.config.item_url(resource, id.as_str());
        self.execute(RemoteOperation::Update, url, Some(payload))
    }

    fn delete(&self, resource: &str, id: &CustomerId) -> RemoteResult {
        let url = self.config.item_url(resource, id.as_str());
        self.execute(RemoteOperation::Delete, url, None)
    }
}

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer {
    /// Handles a request for `path` (URL without scheme and host).
    fn handle(&self, method: HttpMethod, path: &str, body: Option<&[u8]>) -> HttpResponse;
}

/// A loopback HTTP client that routes requests directly to an in-process server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }

    /// Returns the server.
    pub fn server(&self) -> &S {
        &self.server
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        // Strip scheme and authority
        let path = request
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .and_then(|rest| rest.find('/').map(|i| &rest[i..]))
            .unwrap_or(&request.url);

        Ok(self
            .server
            .handle(request.method, path, request.body.as_deref()))
    }
}
