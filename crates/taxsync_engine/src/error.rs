//! Error types for the reconciliation engine.

use crate::config::ReconcilerConfig;
use crate::remote::RemoteOperation;
use taxsync_protocol::{CustomerId, FailureSignal};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur while reconciling one customer.
///
/// None of these cross the reconciler's entry points; they are turned into
/// diagnostics and an unconfirmed outcome.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Create was rejected because the remote already has the customer.
    #[error("Could not create customer #{customer_id}: {message}")]
    RemoteUnprocessable {
        /// Customer ID.
        customer_id: CustomerId,
        /// Raw remote message.
        message: String,
    },

    /// Update was rejected because the remote does not have the customer.
    #[error("Could not update customer #{customer_id}: {message}")]
    RemoteNotFound {
        /// Customer ID.
        customer_id: CustomerId,
        /// Raw remote message.
        message: String,
    },

    /// Any other remote failure. Terminal for the event.
    #[error("Could not {operation} customer #{customer_id}: {message}")]
    RemoteOther {
        /// Operation that failed.
        operation: RemoteOperation,
        /// Customer ID.
        customer_id: CustomerId,
        /// Status code, if the failure carried one.
        status: Option<u16>,
        /// Raw remote message.
        message: String,
    },

    /// The single fallback attempt failed too.
    #[error("Could not {fallback} customer #{customer_id}: {fallback_message} (after {primary} failed: {primary_message})")]
    FallbackExhausted {
        /// Customer ID.
        customer_id: CustomerId,
        /// Primary operation.
        primary: RemoteOperation,
        /// Message of the primary failure.
        primary_message: String,
        /// Fallback operation.
        fallback: RemoteOperation,
        /// Message of the fallback failure.
        fallback_message: String,
    },

    /// Recording the sync time failed after the remote confirmed.
    #[error("Could not record sync time for customer #{customer_id}: {source}")]
    Persistence {
        /// Customer ID.
        customer_id: CustomerId,
        /// Underlying ledger error.
        #[source]
        source: LedgerError,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// Classifies a remote failure of `operation`.
    ///
    /// A create rejected with the configured conflict status and an update
    /// rejected with the configured missing status get their own variants;
    /// everything else is [`SyncError::RemoteOther`].
    pub fn classify(
        operation: RemoteOperation,
        customer_id: &CustomerId,
        failure: &FailureSignal,
        config: &ReconcilerConfig,
    ) -> Self {
        let customer_id = customer_id.clone();
        let message = failure.raw_message.clone();

        match operation {
            RemoteOperation::Create if failure.has_status(config.create_conflict_status) => {
                SyncError::RemoteUnprocessable {
                    customer_id,
                    message,
                }
            }
            RemoteOperation::Update if failure.has_status(config.update_missing_status) => {
                SyncError::RemoteNotFound {
                    customer_id,
                    message,
                }
            }
            _ => SyncError::RemoteOther {
                operation,
                customer_id,
                status: failure.status_code,
                message,
            },
        }
    }

    /// Returns true if this failure warrants the opposite operation.
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(
            self,
            SyncError::RemoteUnprocessable { .. } | SyncError::RemoteNotFound { .. }
        )
    }

    /// Returns the raw remote message, if this is a remote failure.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            SyncError::RemoteUnprocessable { message, .. }
            | SyncError::RemoteNotFound { message, .. }
            | SyncError::RemoteOther { message, .. } => Some(message),
            SyncError::FallbackExhausted {
                fallback_message, ..
            } => Some(fallback_message),
            _ => None,
        }
    }
}

/// Errors raised by a sync ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Reading or writing the ledger file failed.
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),

    /// The ledger file is not valid JSON.
    #[error("ledger is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    /// The ledger refused the write.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}
