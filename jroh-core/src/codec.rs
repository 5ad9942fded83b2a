//! Codec for JSON-RPC message decoding and encoding
//!
//! This module turns raw HTTP bodies into [`Message`] payloads and response
//! values back into JSON text. Beyond plain serde it adds:
//!
//! - **Batch handling**: a JSON array decodes to `Message::Batch` with each
//!   element kept as a raw value, so malformed elements fail individually
//!   at dispatch time instead of poisoning the whole batch
//! - **Error mapping**: decode failures become spec-compliant errors
//!   (-32700 for unparseable bodies, -32600 for well-formed JSON that is
//!   not a request object, including the empty batch)
//!
//! # Examples
//!
//! ```rust
//! use jroh_core::{codec, Message};
//!
//! let msg = codec::decode(br#"{"jsonrpc":"2.0","method":"sum","params":[1,2],"id":1}"#).unwrap();
//! assert!(!msg.is_batch());
//!
//! let batch = codec::decode(br#"[{"jsonrpc":"2.0","method":"a","id":1},{"jsonrpc":"2.0","method":"b","id":2}]"#).unwrap();
//! assert!(batch.is_batch());
//! ```

use crate::error::{Error, Result, RpcError};
use crate::types::{Message, Request, Response};

/// Decode a raw request body into a JSON-RPC payload
///
/// The two-step decode (body → `Value` → shape) lets arrays be detected and
/// split before any per-request validation happens.
///
/// # Errors
///
/// - `ParseError` (-32700) if the body is not valid JSON
/// - `InvalidRequestError` (-32600) if the JSON is an empty array, a bare
///   scalar, or an object that is not a request (e.g. missing `method`)
pub fn decode(body: &[u8]) -> Result<Message> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|_e| {
        tracing::error!("invalid json");
        let shown = String::from_utf8_lossy(body);
        Error::Rpc(RpcError::parse_error().with_detail(format!("Invalid JSON: {:?}", shown)))
    })?;

    match value {
        serde_json::Value::Array(elements) => {
            if elements.is_empty() {
                return Err(Error::Rpc(
                    RpcError::invalid_request().with_detail("Empty array"),
                ));
            }
            Ok(Message::Batch(elements))
        }
        other => Ok(Message::Single(decode_element(other)?)),
    }
}

/// Decode one raw value (a batch element or a single body) into a request
///
/// # Errors
///
/// `InvalidRequestError` if the value is not an object or is missing the
/// members a request must carry.
pub fn decode_element(value: serde_json::Value) -> Result<Request> {
    if !value.is_object() {
        return Err(Error::Rpc(
            RpcError::invalid_request().with_detail(format!("Invalid JSON: {}", value)),
        ));
    }
    let shown = value.clone();
    serde_json::from_value(value).map_err(|_e| {
        tracing::warn!("invalid request object");
        Error::Rpc(RpcError::invalid_request().with_detail(format!("Invalid JSON: {}", shown)))
    })
}

/// Encode a single response to JSON text
pub fn encode_response(resp: &Response) -> Result<String> {
    serde_json::to_string(resp).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a batch of responses to a JSON array
pub fn encode_batch(responses: &[Response]) -> Result<String> {
    serde_json::to_string(responses).map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Id;
    use serde_json::json;

    #[test]
    fn test_decode_single_request() {
        let msg = decode(br#"{"jsonrpc":"2.0","method":"test","id":1}"#).unwrap();
        match msg {
            Message::Single(req) => {
                assert_eq!(req.method, "test");
                assert_eq!(req.id, Some(Id::Number(1)));
            }
            _ => panic!("Expected single request"),
        }
    }

    #[test]
    fn test_decode_notification() {
        let msg = decode(br#"{"jsonrpc":"2.0","method":"notify"}"#).unwrap();
        match msg {
            Message::Single(req) => assert!(req.is_notification()),
            _ => panic!("Expected single request"),
        }
    }

    #[test]
    fn test_decode_batch() {
        let msg = decode(
            br#"[{"jsonrpc":"2.0","method":"a","id":1},{"jsonrpc":"2.0","method":"b","id":2}]"#,
        )
        .unwrap();
        match msg {
            Message::Batch(items) => assert_eq!(items.len(), 2),
            _ => panic!("Expected batch"),
        }
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode(b"not valid json").unwrap_err();
        match err {
            Error::Rpc(e) => assert_eq!(e.code, -32700),
            _ => panic!("Expected Rpc error"),
        }
    }

    #[test]
    fn test_decode_empty_batch() {
        let err = decode(b"[]").unwrap_err();
        match err {
            Error::Rpc(e) => {
                assert_eq!(e.code, -32600);
                assert_eq!(e.data, Some(json!({"message": "Empty array"})));
            }
            _ => panic!("Expected Rpc error"),
        }
    }

    #[test]
    fn test_decode_scalar_body() {
        let err = decode(b"1").unwrap_err();
        match err {
            Error::Rpc(e) => assert_eq!(e.code, -32600),
            _ => panic!("Expected Rpc error"),
        }
    }

    #[test]
    fn test_decode_element_missing_method() {
        let err = decode_element(json!({"jsonrpc": "2.0", "id": 1})).unwrap_err();
        match err {
            Error::Rpc(e) => assert_eq!(e.code, -32600),
            _ => panic!("Expected Rpc error"),
        }
    }

    #[test]
    fn test_batch_elements_kept_raw() {
        // A malformed element survives decoding; it fails at dispatch time
        let msg = decode(br#"[{"jsonrpc":"2.0","method":"a","id":1}, 1]"#).unwrap();
        match msg {
            Message::Batch(items) => {
                assert_eq!(items.len(), 2);
                assert!(decode_element(items[0].clone()).is_ok());
                assert!(decode_element(items[1].clone()).is_err());
            }
            _ => panic!("Expected batch"),
        }
    }

    #[test]
    fn test_encode_response() {
        let resp = Response::success(json!(3), Id::Number(1));
        let encoded = encode_response(&resp).unwrap();
        assert!(encoded.contains("\"result\":3"));
        assert!(!encoded.contains("\"error\""));
    }

    #[test]
    fn test_encode_batch() {
        let responses = vec![
            Response::success(json!(1), Id::Number(1)),
            Response::error(RpcError::invalid_request(), Id::Null),
        ];
        let encoded = encode_batch(&responses).unwrap();
        assert!(encoded.starts_with('['));
        assert!(encoded.ends_with(']'));
    }
}
