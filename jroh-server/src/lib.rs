//! Type-driven JSON-RPC 2.0 dispatch over HTTP
//!
//! This crate is the server side of jroh: methods register on a [`Site`]
//! with a declared signature, and the dispatcher validates, coerces and
//! routes incoming JSON-RPC 2.0 requests (single or batched) to them.
//!
//! # Core Features
//!
//! - **Method registry**: name → handler table with per-method options
//!   (`validate`, `notification`, auth) and last-write-wins registration
//! - **Typed signatures**: parameters and returns declare [`TypeSpec`]
//!   descriptors; raw params are loaded and constraint-checked before the
//!   handler runs
//! - **Batch dispatch**: sequential, order-preserving, with per-element
//!   error isolation and later-wins header merging
//! - **Notifications**: id-less requests produce no response body, with a
//!   per-method opt-out
//! - **Error mapping**: custom domain errors resolve through registered
//!   error handlers, most-derived kind first
//! - **Self-description**: the built-in `rpc.describe` method and an
//!   OpenRPC exporter
//! - **Blueprints**: modular sub-registries merged at wiring time
//! - **HTTP mount**: an axum router exposing the POST endpoint and a GET
//!   convenience form
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jroh_server::{from_typed_fn, http, Method, ServiceConfig, Site};
//! use jroh_core::schema::TypeSpec;
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Deserialize)]
//! struct SumParams { a: f64, b: f64 }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut site = Site::new(ServiceConfig::new("/api"));
//!     site.register(
//!         Method::new("App.sum", from_typed_fn(|p: SumParams| async move { Ok(p.a + p.b) }))
//!             .param("a", TypeSpec::Float)
//!             .param("b", TypeSpec::Float)
//!             .returns(TypeSpec::Float),
//!     )?;
//!
//!     let app = http::mount(Arc::new(site));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency model
//!
//! Registration happens single-threaded at start-up; afterwards the method
//! table is read-only and shared across request tasks without locks. A
//! handler may be sync or async - invocation is awaited uniformly, and it
//! is the only suspension point in the dispatch pipeline. Batches are
//! deliberately not parallelized: sequential dispatch keeps header-merge
//! order and per-element error isolation deterministic.

pub mod auth;
pub mod blueprint;
pub mod config;
pub mod describe;
pub mod dispatch;
pub mod handler;
pub mod http;
pub mod method;
pub mod openrpc;
pub mod registry;

pub use auth::{backend_from_fn, AuthBackend};
pub use blueprint::Blueprint;
pub use config::ServiceConfig;
pub use describe::{FieldDescribe, MethodDescribe, ServiceDescribe};
pub use dispatch::HttpReply;
pub use handler::{from_fn, from_typed_fn, CustomError, Handler, HandlerError, Reply};
pub use method::{ErrorDoc, ExampleDoc, Method, MethodDescriptor, RegistrationError, Signature};
pub use registry::{ErrorHandlerTable, ErrorReply, Site, DESCRIBE_METHOD_NAME};

// Re-exported so signatures can be declared without importing jroh-core
// explicitly
pub use jroh_core::schema::TypeSpec;
