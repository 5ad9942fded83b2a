//! Error types for jroh
//!
//! This module provides error handling for JSON-RPC 2.0 dispatch. It defines
//! two main error types:
//!
//! - **Error**: Application-level errors for internal use (uses thiserror)
//! - **RpcError**: Wire-format errors as defined in the JSON-RPC 2.0 spec
//!
//! # Spec-Compliant Error Codes
//!
//! JSON-RPC 2.0 reserves the codes from -32768 to -32000 for pre-defined
//! errors:
//!
//! - `-32700`: Parse error (invalid JSON)
//! - `-32600`: Invalid request (malformed request object)
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000 to -32099`: Server error (implementation-defined)
//!
//! Application-defined errors use codes outside the reserved range; the
//! credential-check failure uses `401`, mirroring its HTTP status.
//!
//! # HTTP status mapping
//!
//! Every `RpcError` carries an HTTP status code alongside its JSON-RPC code.
//! The status never appears on the wire inside the error object - it decides
//! the status of the surrounding HTTP response: 400 for protocol-level
//! failures, 500 for server errors, 401 for credential failures. Custom
//! errors may override it.
//!
//! # Examples
//!
//! ```rust
//! use jroh_core::RpcError;
//!
//! let err = RpcError::method_not_found("unknownMethod");
//! assert_eq!(err.code, -32601);
//! assert_eq!(err.http_status, 400);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::schema::load::LoadError;

/// Result type for jroh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error type for jroh operations
///
/// Covers everything that can go wrong between receiving a raw HTTP body
/// and producing a response. Convertible into wire-format [`RpcError`]
/// values for transmission.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// JSON-RPC protocol error (already in wire format)
    #[error("JSON-RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Serialization or deserialization error
    ///
    /// Occurs when converting between Rust types and JSON, usually a
    /// mismatch between expected and actual data structures.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Type loading / coercion error
    ///
    /// Raised by the schema engine when a raw value's shape cannot satisfy
    /// a declared type descriptor. Surfaces as an invalid-params error at
    /// the dispatch boundary.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

fn default_http_status() -> u16 {
    400
}

/// JSON-RPC 2.0 error object as it appears on the wire
///
/// This structure is the exact `error` member of a response:
/// `{name, code, message, data}`. The `name` member identifies the error
/// class for clients that dispatch on it; `data` carries structured detail
/// (most errors here use `{"message": ...}`).
///
/// The associated HTTP status is carried out-of-band in `http_status` and
/// is never serialized.
///
/// # Examples
///
/// ```rust
/// use jroh_core::RpcError;
/// use serde_json::json;
///
/// let err = RpcError::invalid_request().with_detail("Empty array");
/// assert_eq!(err.code, -32600);
/// assert_eq!(err.data, Some(json!({"message": "Empty array"})));
///
/// // Custom application error with its own HTTP status
/// let custom = RpcError::new(1001, "InsufficientFunds", "Insufficient funds")
///     .with_http_status(409);
/// assert_eq!(custom.http_status, 409);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Error class name, e.g. `"MethodNotFoundError"`
    pub name: String,
    /// Numeric JSON-RPC error code
    pub code: i32,
    /// Short human-readable error message
    pub message: String,
    /// Additional structured error information (often `{"message": ...}`)
    pub data: Option<serde_json::Value>,
    /// HTTP status of the surrounding response; not part of the wire format
    #[serde(skip_serializing, default = "default_http_status")]
    pub http_status: u16,
}

impl RpcError {
    /// Create an error with an explicit name, code and message
    ///
    /// Use the factory methods for the spec-reserved codes; this
    /// constructor is for application-defined errors.
    pub fn new(code: i32, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code,
            message: message.into(),
            data: None,
            http_status: 400,
        }
    }

    /// Attach structured `data` to the error
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach a `{"message": ...}` data member
    ///
    /// The canonical short message stays in `message`; the detail string
    /// lands in `data.message`, which is where dispatch-level context
    /// (offending value, method name, parse detail) is reported.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.data = Some(serde_json::json!({ "message": detail.into() }));
        self
    }

    /// Override the HTTP status of the surrounding response
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = status;
        self
    }

    /// Parse error (-32700): the body was not valid JSON
    pub fn parse_error() -> Self {
        Self::new(-32700, "ParseError", "Parse error")
    }

    /// Invalid request (-32600): the JSON is not a valid Request object
    pub fn invalid_request() -> Self {
        Self::new(-32600, "InvalidRequestError", "Invalid Request")
    }

    /// Method not found (-32601)
    pub fn method_not_found(method: impl AsRef<str>) -> Self {
        Self::new(-32601, "MethodNotFoundError", "Method not found")
            .with_detail(format!("Method not found: {}", method.as_ref()))
    }

    /// Invalid params (-32602): the method exists, the parameters don't fit
    pub fn invalid_params() -> Self {
        Self::new(-32602, "InvalidParamsError", "Invalid params")
    }

    /// Internal error (-32603)
    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(-32603, "InternalError", "Internal error").with_detail(detail)
    }

    /// Server error (-32000): catch-all for handler failures, HTTP 500
    pub fn server_error() -> Self {
        Self::new(-32000, "ServerError", "Server error").with_http_status(500)
    }

    /// Credential check failure (401), HTTP 401
    pub fn invalid_credentials() -> Self {
        Self::new(401, "InvalidCredentialsError", "Invalid login credentials").with_http_status(401)
    }
}

impl std::fmt::Display for RpcError {
    /// Formats as "[code] message" for readability in logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reserved_error_codes() {
        let errors = vec![
            (RpcError::parse_error(), -32700, 400),
            (RpcError::invalid_request(), -32600, 400),
            (RpcError::method_not_found("test"), -32601, 400),
            (RpcError::invalid_params(), -32602, 400),
            (RpcError::internal_error("test"), -32603, 400),
            (RpcError::server_error(), -32000, 500),
        ];

        for (error, expected_code, expected_status) in errors {
            assert_eq!(error.code, expected_code);
            assert_eq!(error.http_status, expected_status);
            assert!(!error.message.is_empty());
        }
    }

    #[test]
    fn test_invalid_credentials() {
        let error = RpcError::invalid_credentials();
        assert_eq!(error.code, 401);
        assert_eq!(error.http_status, 401);
        assert_eq!(error.name, "InvalidCredentialsError");
    }

    #[test]
    fn test_with_detail() {
        let error = RpcError::invalid_request().with_detail("Empty array");
        assert_eq!(error.data, Some(json!({"message": "Empty array"})));
        assert_eq!(error.message, "Invalid Request");
    }

    #[test]
    fn test_method_not_found_detail() {
        let error = RpcError::method_not_found("unknownMethod");
        assert_eq!(
            error.data,
            Some(json!({"message": "Method not found: unknownMethod"}))
        );
    }

    #[test]
    fn test_http_status_not_serialized() {
        let error = RpcError::server_error();
        let serialized = serde_json::to_string(&error).unwrap();
        assert!(!serialized.contains("http_status"));
        assert!(serialized.contains("-32000"));
        assert!(serialized.contains("\"name\":\"ServerError\""));
    }

    #[test]
    fn test_error_roundtrip() {
        let error = RpcError::new(1001, "CustomError", "Custom failure").with_data(json!({"k": "v"}));
        let serialized = serde_json::to_string(&error).unwrap();
        let decoded: RpcError = serde_json::from_str(&serialized).unwrap();

        assert_eq!(decoded.code, error.code);
        assert_eq!(decoded.name, error.name);
        assert_eq!(decoded.data, error.data);
        // http_status is out-of-band; decoding falls back to the default
        assert_eq!(decoded.http_status, 400);
    }

    #[test]
    fn test_error_display() {
        let error = RpcError::method_not_found("testMethod");
        let display = format!("{}", error);
        assert!(display.contains("-32601"));
        assert!(display.contains("Method not found"));
    }

    #[test]
    fn test_app_error_from_rpc() {
        let error: Error = RpcError::parse_error().into();
        match error {
            Error::Rpc(e) => assert_eq!(e.code, -32700),
            _ => panic!("Expected Rpc error"),
        }
    }
}
