//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while parsing or encoding protocol types.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The exemption type string is not one the remote service accepts.
    #[error("unknown exemption type: '{0}' (expected wholesale, government, other or non_exempt)")]
    UnknownExemptionType(String),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProtocolError::UnknownExemptionType("charity".into());
        assert!(err.to_string().contains("charity"));
        assert!(err.to_string().contains("non_exempt"));
    }
}
