//! Core JSON-RPC 2.0 types, codec and schema engine for jroh
//!
//! This crate provides the foundational pieces for the jroh dispatch layer:
//!
//! - **Types**: JSON-RPC 2.0 data structures (requests, responses, batches)
//! - **Codec**: decoding raw HTTP bodies into payloads and encoding
//!   responses back to JSON
//! - **Error handling**: the application error type and the wire-format
//!   error object with the reserved JSON-RPC codes and their HTTP statuses
//! - **Schema engine**: the declarative type-descriptor DSL, the six-type
//!   wire taxonomy, the loader/coercion engine, and constraint facets
//!
//! # Overview
//!
//! The crate is transport-agnostic: it knows how to decode, validate and
//! describe JSON-RPC payloads, but not how they arrive. The `jroh-server`
//! crate builds the method registry, dispatcher and HTTP mount on top of
//! this foundation.
//!
//! # Example
//!
//! ```rust
//! use jroh_core::{codec, Message};
//! use jroh_core::schema::{load, TypeSpec};
//! use serde_json::json;
//!
//! // Decode a request body
//! let msg = codec::decode(br#"{"jsonrpc":"2.0","method":"sum","params":[1,2],"id":1}"#).unwrap();
//! assert!(matches!(msg, Message::Single(_)));
//!
//! // Validate a parameter value against its declared type
//! let loaded = load(&TypeSpec::list(TypeSpec::Int), json!([1, 2])).unwrap();
//! assert_eq!(loaded, json!([1, 2]));
//! ```

pub mod codec;
pub mod error;
pub mod schema;
pub mod types;

// Re-export the most commonly used types for convenience
pub use error::{Error, LoadError, Result, RpcError};
pub use types::{Id, Message, Request, Response, JSONRPC_VERSION};
