//! Service configuration.

use taxsync_protocol::CUSTOMERS_RESOURCE;

/// Configuration for the reference customer service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Collection name served under `/{resource}`.
    pub resource: String,
    /// Whether successful responses echo the stored customer.
    pub echo_resource: bool,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Whether deleting an unknown customer is a 404.
    pub strict_delete: bool,
}

impl ServiceConfig {
    /// Creates a configuration serving `resource`.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            echo_resource: true,
            max_body_bytes: 64 * 1024,
            strict_delete: true,
        }
    }

    /// Sets whether successful responses echo the customer.
    pub fn with_echo_resource(mut self, echo: bool) -> Self {
        self.echo_resource = echo;
        self
    }

    /// Sets the maximum request body size.
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Sets whether deleting an unknown customer fails.
    pub fn with_strict_delete(mut self, strict: bool) -> Self {
        self.strict_delete = strict;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(CUSTOMERS_RESOURCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.resource, "customers");
        assert!(config.echo_resource);
        assert!(config.strict_delete);
    }

    #[test]
    fn config_builder() {
        let config = ServiceConfig::new("clients")
            .with_echo_resource(false)
            .with_max_body_bytes(16)
            .with_strict_delete(false);

        assert_eq!(config.resource, "clients");
        assert!(!config.echo_resource);
        assert_eq!(config.max_body_bytes, 16);
        assert!(!config.strict_delete);
    }
}
