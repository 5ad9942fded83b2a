//! Handler traits and types for JSON-RPC methods
//!
//! The [`Handler`] trait is the interface every method implementation
//! satisfies. It is:
//!
//! - **Async-compatible**: returns a pinned, boxed future, so sync and
//!   async implementations are invoked uniformly
//! - **Thread-safe**: `Send + Sync`, shared read-only across requests
//! - **Type-erased**: works with `serde_json::Value` at the boundary; the
//!   dispatcher has already validated and coerced the bound parameters
//!   against the method's declared signature
//!
//! # Creating handlers
//!
//! 1. [`from_fn`]: wrap an async closure over the raw bound-params value
//! 2. [`from_typed_fn`]: wrap an async closure with serde-typed params and
//!    return value
//!
//! # Reply shapes
//!
//! A handler produces a [`Reply`]: a body plus an optional HTTP status and
//! extra headers. `From` conversions cover the usual shapes - a bare value,
//! `(value, status)`, `(value, headers)`, `(value, status, headers)` - so a
//! handler can return whichever fits.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::{from_fn, from_typed_fn, Reply};
//! use serde::Deserialize;
//!
//! let raw = from_fn(|params| async move {
//!     Ok(Reply::new(serde_json::json!({"echo": params})))
//! });
//!
//! #[derive(Deserialize)]
//! struct SumParams { a: f64, b: f64 }
//!
//! let typed = from_typed_fn(|p: SumParams| async move { Ok(p.a + p.b) });
//! ```

use futures::future::BoxFuture;
use jroh_core::{LoadError, RpcError};
use serde_json::Value;
use std::future::Future;

/// Future type produced by handler invocation
///
/// Boxed and pinned so that handlers with different concrete future types
/// store uniformly in the registry; awaiting it is the dispatch pipeline's
/// only suspension point.
pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// What a handler invocation resolves to
pub type HandlerResult = Result<Reply, HandlerError>;

/// A handler's reply: body plus optional HTTP status and extra headers
///
/// The default status is 200; headers are merged into the HTTP response
/// (and, for batch sub-calls, merged across the batch in array order with
/// later entries winning on key collision).
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub body: Value,
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
}

impl Reply {
    /// A body-only reply (status 200, no extra headers)
    pub fn new(body: Value) -> Self {
        Self {
            body,
            status: None,
            headers: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The effective HTTP status of this reply
    pub fn status_or_default(&self) -> u16 {
        self.status.unwrap_or(200)
    }
}

impl From<Value> for Reply {
    fn from(body: Value) -> Self {
        Reply::new(body)
    }
}

impl From<(Value, u16)> for Reply {
    fn from((body, status): (Value, u16)) -> Self {
        Reply::new(body).with_status(status)
    }
}

impl From<(Value, Vec<(String, String)>)> for Reply {
    fn from((body, headers): (Value, Vec<(String, String)>)) -> Self {
        Reply {
            body,
            status: None,
            headers,
        }
    }
}

impl From<(Value, u16, Vec<(String, String)>)> for Reply {
    fn from((body, status, headers): (Value, u16, Vec<(String, String)>)) -> Self {
        Reply {
            body,
            status: Some(status),
            headers,
        }
    }
}

/// A domain error raised by a handler, subject to error-handler mapping
///
/// Carries a *kind chain* ordered base-first: `["value_error"]` refined
/// with `"my_error"` models an error class derived from a more general
/// one. Error-handler lookup walks the chain most-derived-first, so a
/// handler registered for `"my_error"` wins over one for `"value_error"`.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomError {
    kinds: Vec<String>,
    pub message: String,
    pub data: Option<Value>,
}

impl CustomError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kinds: vec![kind.into()],
            message: message.into(),
            data: None,
        }
    }

    /// Append a more derived kind to the chain
    pub fn refine(mut self, kind: impl Into<String>) -> Self {
        self.kinds.push(kind.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// The kind chain, most-derived first
    pub fn kind_chain(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().rev().map(String::as_str)
    }
}

impl std::fmt::Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CustomError {}

/// Everything a handler invocation can fail with
#[derive(Debug, Clone)]
pub enum HandlerError {
    /// A pre-formed JSON-RPC error; passes through to the wire unchanged
    Rpc(RpcError),
    /// A domain error; consults the registered error handlers, falling
    /// back to a generic server error
    Custom(CustomError),
}

impl From<RpcError> for HandlerError {
    fn from(e: RpcError) -> Self {
        HandlerError::Rpc(e)
    }
}

impl From<CustomError> for HandlerError {
    fn from(e: CustomError) -> Self {
        HandlerError::Custom(e)
    }
}

impl From<LoadError> for HandlerError {
    fn from(e: LoadError) -> Self {
        HandlerError::Rpc(RpcError::invalid_params().with_detail(e.message))
    }
}

/// Trait for JSON-RPC method handlers
///
/// Implementations receive the bound parameter value - for a method with a
/// declared signature, a JSON object keyed by parameter name with every
/// value already loaded against its descriptor; for a non-validating
/// method without declared parameters, the raw `params` member.
///
/// You typically don't implement this trait directly; use [`from_fn`] or
/// [`from_typed_fn`].
pub trait Handler: Send + Sync {
    fn call(&self, params: Value) -> HandlerFuture;
}

/// Wrapper that adapts an async function into a [`Handler`]
///
/// Exists because the `Handler` trait can't be implemented for foreign
/// closure types directly; the wrapper is a type this crate owns.
pub struct AsyncHandler<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    func: F,
}

impl<F, Fut> Handler for AsyncHandler<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, params: Value) -> HandlerFuture {
        Box::pin((self.func)(params))
    }
}

/// Create a handler from an async function over the raw bound params
///
/// The function receives the bound parameter value and returns a
/// [`Reply`] (or an error). This is the right shape when the handler
/// wants to set a status code or headers.
///
/// # Examples
///
/// ```rust
/// use jroh_server::{from_fn, Reply};
///
/// let handler = from_fn(|params| async move {
///     Ok(Reply::new(serde_json::json!({"received": params})).with_status(201))
/// });
/// ```
pub fn from_fn<F, Fut>(func: F) -> Box<dyn Handler>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Box::new(AsyncHandler { func })
}

/// Create a handler with serde-typed params and return value
///
/// Deserializes the bound params object into `P`, calls the function, and
/// serializes the `R` it returns into a body-only [`Reply`]. The schema
/// engine has already validated shapes, so a deserialization failure here
/// means the declared signature and `P` disagree - it surfaces as an
/// invalid-params error carrying serde's message.
///
/// # Examples
///
/// ```rust
/// use jroh_server::from_typed_fn;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct SubtractParams { minuend: i64, subtrahend: i64 }
///
/// let handler = from_typed_fn(|p: SubtractParams| async move {
///     Ok(p.minuend - p.subtrahend)
/// });
/// ```
pub fn from_typed_fn<P, R, F, Fut>(func: F) -> Box<dyn Handler>
where
    P: serde::de::DeserializeOwned + Send + 'static,
    R: serde::Serialize + Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
{
    use std::sync::Arc;
    let func = Arc::new(func);

    from_fn(move |params: Value| {
        let func = Arc::clone(&func);
        async move {
            // A zero-param method binds an empty object; unit param types
            // deserialize from null, so retry that way before failing
            let empty = params.as_object().is_some_and(|o| o.is_empty());
            let params: P = match serde_json::from_value(params) {
                Ok(p) => p,
                Err(_) if empty => serde_json::from_value(Value::Null).map_err(|e| {
                    HandlerError::Rpc(RpcError::invalid_params().with_detail(e.to_string()))
                })?,
                Err(e) => {
                    return Err(HandlerError::Rpc(
                        RpcError::invalid_params().with_detail(e.to_string()),
                    ))
                }
            };
            let result = func(params).await?;
            let body = serde_json::to_value(result)
                .map_err(|e| HandlerError::Rpc(RpcError::server_error().with_detail(e.to_string())))?;
            Ok(Reply::new(body))
        }
    })
}
