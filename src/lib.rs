//! jroh - JSON-RPC 2.0 Over HTTP
//!
//! This is the main convenience crate that re-exports the jroh sub-crates.
//! Use it if you want a single dependency for building a type-driven
//! JSON-RPC 2.0 service.
//!
//! # Architecture
//!
//! jroh is organized into modular crates:
//!
//! - **jroh-core**: wire types, codec, error taxonomy, schema engine
//! - **jroh-server**: method registry, dispatcher, service description,
//!   OpenRPC export, HTTP mount
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jroh::{from_typed_fn, Method, ServiceConfig, Site, TypeSpec};
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
//!     let app = jroh::server::http::mount(Arc::new(site));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

// Re-export all public APIs from sub-crates so users can reach everything
// through the `jroh::` prefix
pub use jroh_core as core;
pub use jroh_server as server;

pub use jroh_core::schema::{self, TypeSpec, WireType};
pub use jroh_core::{codec, Error, Id, LoadError, Message, Request, Response, Result, RpcError};
pub use jroh_server::{
    backend_from_fn, from_fn, from_typed_fn, Blueprint, CustomError, Handler, HandlerError,
    Method, Reply, ServiceConfig, Site,
};
