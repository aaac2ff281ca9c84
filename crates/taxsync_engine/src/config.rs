//! Configuration for the reconciler and the HTTP remote client.

use crate::error::{SyncError, SyncResult};
use std::time::Duration;
use taxsync_protocol::CUSTOMERS_RESOURCE;

/// Configuration for reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Remote resource type the customers live under.
    pub resource: String,
    /// Status a create fails with when the remote already has the customer.
    pub create_conflict_status: u16,
    /// Status an update fails with when the remote does not have the customer.
    pub update_missing_status: u16,
}

impl ReconcilerConfig {
    /// Creates a configuration for the given resource type.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            create_conflict_status: 422,
            update_missing_status: 404,
        }
    }

    /// Sets the create-conflict status.
    pub fn with_create_conflict_status(mut self, status: u16) -> Self {
        self.create_conflict_status = status;
        self
    }

    /// Sets the update-missing status.
    pub fn with_update_missing_status(mut self, status: u16) -> Self {
        self.update_missing_status = status;
        self
    }

    /// Checks the configuration for values the reconciler cannot work with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.resource.trim().is_empty() {
            return Err(SyncError::Config("resource must not be empty".into()));
        }
        for status in [self.create_conflict_status, self.update_missing_status] {
            if !(400..500).contains(&status) {
                return Err(SyncError::Config(format!(
                    "fallback trigger {status} is not a client error status"
                )));
            }
        }
        if self.create_conflict_status == self.update_missing_status {
            return Err(SyncError::Config(
                "create and update fallback triggers must differ".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self::new(CUSTOMERS_RESOURCE)
    }
}

/// Configuration for the HTTP remote client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the remote API (e.g., "https://api.taxjar.com/v2").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl HttpConfig {
    /// Creates a new HTTP configuration.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("taxsync/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the URL of a resource collection.
    pub fn collection_url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), resource)
    }

    /// Returns the URL of a single resource.
    ///
    /// The id is percent-encoded as one path segment.
    pub fn item_url(&self, resource: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(resource),
            urlencoding::encode(id)
        )
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconciler_config_defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.resource, "customers");
        assert_eq!(config.create_conflict_status, 422);
        assert_eq!(config.update_missing_status, 404);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reconciler_config_validation() {
        assert!(ReconcilerConfig::new("").validate().is_err());
        assert!(ReconcilerConfig::default()
            .with_create_conflict_status(500)
            .validate()
            .is_err());
        assert!(ReconcilerConfig::default()
            .with_create_conflict_status(404)
            .validate()
            .is_err());
        assert!(ReconcilerConfig::default()
            .with_create_conflict_status(409)
            .validate()
            .is_ok());
    }

    #[test]
    fn http_config_builder() {
        let config = HttpConfig::new("https://api.example.com/v2/")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent");

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(
            config.collection_url("customers"),
            "https://api.example.com/v2/customers"
        );
        assert_eq!(
            config.item_url("customers", "42"),
            "https://api.example.com/v2/customers/42"
        );
    }

    #[test]
    fn item_url_escapes_id() {
        let config = HttpConfig::new("https://api.example.com/v2");
        assert_eq!(
            config.item_url("customers", "ab/12"),
            "https://api.example.com/v2/customers/ab%2F12"
        );
        assert_eq!(
            config.item_url("customers", "a b?c"),
            "https://api.example.com/v2/customers/a%20b%3Fc"
        );
    }
}
