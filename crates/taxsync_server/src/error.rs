//! Error types for the reference service.

use serde_json::json;
use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by the reference service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Malformed request or unknown route.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The customer does not exist.
    #[error("customer {0} not found")]
    NotFound(String),

    /// The customer already exists.
    #[error("customer {0} already exists")]
    AlreadyExists(String),

    /// The payload failed validation.
    #[error("unprocessable customer: {0}")]
    Unprocessable(String),

    /// A failure scripted through fault injection.
    #[error("{message}")]
    Injected {
        /// Status to report.
        status: u16,
        /// Message to report.
        message: String,
    },

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::InvalidRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::AlreadyExists(_) | ServiceError::Unprocessable(_) => 422,
            ServiceError::Injected { status, .. } => *status,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Renders the JSON error body: `{"status": N, "error": ..., "detail": ...}`.
    pub fn to_body(&self) -> Vec<u8> {
        json!({
            "status": self.status(),
            "error": reason_phrase(self.status()),
            "detail": self.to_string(),
        })
        .to_string()
        .into_bytes()
    }
}

/// Returns the standard reason phrase for a status.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ServiceError::InvalidRequest("x".into()).status(), 400);
        assert_eq!(ServiceError::NotFound("1".into()).status(), 404);
        assert_eq!(ServiceError::AlreadyExists("1".into()).status(), 422);
        assert_eq!(ServiceError::Unprocessable("x".into()).status(), 422);
        assert_eq!(ServiceError::Internal("x".into()).status(), 500);
        assert!(!ServiceError::Internal("x".into()).is_client_error());
    }

    #[test]
    fn error_body_carries_status() {
        let body = ServiceError::AlreadyExists("7".into()).to_body();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], 422);
        assert_eq!(value["error"], "Unprocessable Entity");
        assert_eq!(value["detail"], "customer 7 already exists");
    }
}
