//! JSON-RPC 2.0 types as defined in the specification
//!
//! This module implements the core data structures from the JSON-RPC 2.0
//! specification (https://www.jsonrpc.org/specification). These types are
//! designed to be:
//!
//! - **Spec-compliant**: Strict adherence to JSON-RPC 2.0 requirements,
//!   with tolerant decoding of 1.0/1.1-style requests (missing `jsonrpc`)
//! - **Type-safe**: Rust's type system prevents invalid message construction
//! - **Serializable**: Full serde support for JSON encoding/decoding
//!
//! # Message Types
//!
//! An incoming HTTP body decodes to one of:
//!
//! 1. **Request**: A call to a registered method. A request without an `id`
//!    member (or with `id: null`) is a *notification* - the caller expects
//!    no response body.
//! 2. **Batch**: A JSON array of request objects, dispatched together.
//!
//! Outgoing messages are **Response** objects carrying either a `result`
//! or an `error`, never both.

use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version string carried in every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request ID
///
/// The request identifier correlates a request with its response. Per the
/// spec an ID can be a string, number, or null.
///
/// This enum uses `#[serde(untagged)]` to serialize directly as the inner
/// value without a type discriminator, matching the wire format exactly.
///
/// # Examples
///
/// ```rust
/// use jroh_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier - useful for UUIDs or correlation tokens
    String(String),
    /// Numeric identifier - efficient for sequential request counters
    Number(i64),
    /// Null identifier - used on error responses when the request ID
    /// could not be determined
    Null,
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

/// JSON-RPC 2.0 request message
///
/// A request names a method and optionally carries parameters, either
/// by-position (JSON array) or by-name (JSON object).
///
/// # Notifications
///
/// A request whose `id` member is absent (or explicitly `null`) is a
/// *notification*: the caller does not want a response. Whether a given
/// method accepts notification calls is a per-method registration option,
/// enforced by the dispatcher rather than by this type.
///
/// # Version tolerance
///
/// The `jsonrpc` member is optional on decode: JSON-RPC 1.0/1.1 clients
/// omit it. Responses always carry `"2.0"`.
///
/// # Examples
///
/// ```rust
/// use jroh_core::{Request, Id};
/// use serde_json::json;
///
/// let req = Request::new("subtract", Some(json!([42, 23])), Some(Id::Number(1)));
/// assert!(!req.is_notification());
///
/// let notif = Request::new("notify_sum", Some(json!([1, 2, 4])), None);
/// assert!(notif.is_notification());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// JSON-RPC version - "2.0", or absent for 1.0/1.1-style clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    /// Name of the method to invoke
    pub method: String,
    /// Optional parameters: by-position array or by-name object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Request identifier; absent or null marks a notification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
}

impl Request {
    /// Create a new JSON-RPC 2.0 request
    ///
    /// Pass `id: None` to create a notification.
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>, id: Option<Id>) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            method: method.into(),
            params,
            id,
        }
    }

    /// Whether this request is a notification (no usable `id` member)
    pub fn is_notification(&self) -> bool {
        matches!(self.id, None | Some(Id::Null))
    }

    /// The version string to echo on the response
    pub fn version(&self) -> &str {
        self.jsonrpc.as_deref().unwrap_or(JSONRPC_VERSION)
    }

    /// The response ID for this request (`Id::Null` when absent)
    pub fn response_id(&self) -> Id {
        self.id.clone().unwrap_or(Id::Null)
    }
}

/// JSON-RPC 2.0 response message
///
/// A response carries either a `result` (success) or an `error` (failure),
/// never both; the mutual exclusion is enforced by construction through the
/// factory methods.
///
/// If the request `id` could not be determined (e.g. the body was not valid
/// JSON), the response uses `Id::Null`.
///
/// # Examples
///
/// ```rust
/// use jroh_core::{Response, RpcError, Id};
/// use serde_json::json;
///
/// let ok = Response::success(json!({"value": 42}), Id::Number(1));
/// assert!(ok.is_success());
///
/// let err = Response::error(RpcError::method_not_found("unknownMethod"), Id::Number(2));
/// assert!(err.is_error());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// JSON-RPC version - always "2.0"
    pub jsonrpc: String,
    /// Request ID from the original request (for correlation)
    pub id: Id,
    /// The result of the method invocation (present only on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error information (present only on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    /// Create a successful JSON-RPC 2.0 response
    pub fn success(result: serde_json::Value, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error JSON-RPC 2.0 response
    ///
    /// Use `Id::Null` when the request ID couldn't be determined.
    pub fn error(error: RpcError, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Check if the response represents a successful result
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// Check if the response represents an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A decoded JSON-RPC payload: a single request or a batch
///
/// The `Batch` variant stores raw `serde_json::Value` items because each
/// element must be parsed separately - a malformed element yields its own
/// error response in place without aborting the rest of the batch.
#[derive(Debug, Clone)]
pub enum Message {
    /// A single request (or notification)
    Single(Request),
    /// A batch: every element is parsed independently at dispatch time
    Batch(Vec<serde_json::Value>),
}

impl Message {
    /// Check if this payload is a batch
    pub fn is_batch(&self) -> bool {
        matches!(self, Message::Batch(_))
    }
}
