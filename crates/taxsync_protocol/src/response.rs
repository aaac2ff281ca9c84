//! Remote API responses and failures.

use crate::error::ProtocolResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Body of a successful (2xx) remote response.
///
/// A JSON `null` and a missing `customer` key both decode to `None`,
/// meaning the call was accepted but no resource was echoed back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse {
    /// The canonical customer resource, if echoed.
    #[serde(default)]
    pub customer: Option<Value>,
}

impl RemoteResponse {
    /// Creates a response echoing a customer resource.
    pub fn with_customer(customer: Value) -> Self {
        Self {
            customer: match customer {
                Value::Null => None,
                other => Some(other),
            },
        }
    }

    /// Creates a response with no echoed resource.
    pub fn empty() -> Self {
        Self { customer: None }
    }

    /// Decodes a response body. An empty body decodes as an empty response.
    pub fn from_json(bytes: &[u8]) -> ProtocolResult<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encodes the response as a JSON string.
    pub fn to_json_string(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns true if the response echoes a non-null resource.
    pub fn is_confirmed(&self) -> bool {
        self.customer.as_ref().is_some_and(|c| !c.is_null())
    }

    /// Returns the `customer_id` of the echoed resource.
    pub fn remote_customer_id(&self) -> Option<String> {
        match self.customer.as_ref()?.get("customer_id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// A normalized failure reported by the remote client.
///
/// `status_code` is `None` when the failure happened below HTTP (connection
/// refused, undecodable body) and no status could be recovered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", describe(.status_code, .raw_message))]
pub struct FailureSignal {
    /// HTTP-like status code.
    pub status_code: Option<u16>,
    /// Raw message from the remote service or transport.
    pub raw_message: String,
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("status {status}: {message}"),
        None => message.to_string(),
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    status: StatusField,
}

/// Some gateways send the status as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatusField {
    Code(u16),
    Text(String),
}

impl StatusField {
    fn code(&self) -> Option<u16> {
        match self {
            StatusField::Code(code) => Some(*code),
            StatusField::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl FailureSignal {
    /// Creates a failure with a known status.
    pub fn new(status_code: u16, raw_message: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            raw_message: raw_message.into(),
        }
    }

    /// Creates a transport-level failure without a status.
    pub fn transport(raw_message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            raw_message: raw_message.into(),
        }
    }

    /// Builds a failure from a raw error message.
    ///
    /// The remote service reports errors as `{"status": 422, "detail": ...}`,
    /// with the status as a number or a numeric string; when the message
    /// parses that way its status is used.
    pub fn from_message(raw_message: impl Into<String>) -> Self {
        let raw_message = raw_message.into();
        let status_code = serde_json::from_str::<ErrorBody>(&raw_message)
            .ok()
            .and_then(|body| body.status.code());
        Self {
            status_code,
            raw_message,
        }
    }

    /// Returns true if the failure carries the given status.
    pub fn has_status(&self, status: u16) -> bool {
        self.status_code == Some(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_customer_is_unconfirmed() {
        let response = RemoteResponse::from_json(br#"{"customer": null}"#).unwrap();
        assert!(!response.is_confirmed());

        let response = RemoteResponse::from_json(br#"{}"#).unwrap();
        assert!(!response.is_confirmed());

        let response = RemoteResponse::from_json(b"  ").unwrap();
        assert!(!response.is_confirmed());

        assert!(!RemoteResponse::with_customer(Value::Null).is_confirmed());
    }

    #[test]
    fn echoed_customer_is_confirmed() {
        let response =
            RemoteResponse::from_json(br#"{"customer": {"customer_id": "12", "name": "A"}}"#)
                .unwrap();
        assert!(response.is_confirmed());
        assert_eq!(response.remote_customer_id().as_deref(), Some("12"));

        let numeric = RemoteResponse::with_customer(json!({"customer_id": 12}));
        assert_eq!(numeric.remote_customer_id().as_deref(), Some("12"));

        let anonymous = RemoteResponse::with_customer(json!({"name": "A"}));
        assert!(anonymous.is_confirmed());
        assert!(anonymous.remote_customer_id().is_none());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(RemoteResponse::from_json(b"<html>").is_err());
    }

    #[test]
    fn failure_from_json_message() {
        let failure =
            FailureSignal::from_message(r#"{"status":422,"error":"Unprocessable Entity"}"#);
        assert_eq!(failure.status_code, Some(422));
        assert!(failure.has_status(422));

        let failure = FailureSignal::from_message("connection reset by peer");
        assert_eq!(failure.status_code, None);
    }

    #[test]
    fn failure_status_as_string() {
        let failure = FailureSignal::from_message(r#"{"status":"422","detail":"exists"}"#);
        assert_eq!(failure.status_code, Some(422));

        let failure = FailureSignal::from_message(r#"{"status":" 404 "}"#);
        assert_eq!(failure.status_code, Some(404));

        let failure = FailureSignal::from_message(r#"{"status":"error"}"#);
        assert_eq!(failure.status_code, None);
        assert_eq!(failure.raw_message, r#"{"status":"error"}"#);
    }

    #[test]
    fn failure_display() {
        assert_eq!(
            FailureSignal::new(404, "Not Found").to_string(),
            "status 404: Not Found"
        );
        assert_eq!(FailureSignal::transport("timed out").to_string(), "timed out");
    }
}
