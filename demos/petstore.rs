//! Petstore demo server
//!
//! A small end-to-end service showing the main features:
//! 1. Typed method registration with declared signatures
//! 2. Record parameters with field-wise coercion
//! 3. A blueprint merged into the main site
//! 4. Custom error mapping
//! 5. Credential-protected methods
//!
//! Run with:
//!   cargo run --example petstore
//!
//! Then call it:
//!   curl -s -X POST -H 'Content-Type: application/json' \
//!     -d '{"jsonrpc":"2.0","method":"Petstore.echo","params":{"pet":{"name":"rex"}},"id":1}' \
//!     http://localhost:5000/api
//!   curl -s http://localhost:5000/api/rpc.describe

use jroh::schema::{Constraint, RecordSpec, TypeSpec};
use jroh::{backend_from_fn, from_fn, from_typed_fn, Blueprint, CustomError, Method, Reply, ServiceConfig, Site};
use jroh_server::{ErrorDoc, ErrorReply};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
struct SumParams {
    a: f64,
    b: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut site = Site::new(
        ServiceConfig::new("/api")
            .with_name("petstore")
            .with_base_url("http://localhost:5000"),
    );

    site.register(
        Method::new(
            "Petstore.sum",
            from_typed_fn(|p: SumParams| async move { Ok(p.a + p.b) }),
        )
        .param(
            "a",
            TypeSpec::annotated(TypeSpec::Float, vec![Constraint::Minimum(0.0)]),
        )
        .param("b", TypeSpec::Float)
        .returns(TypeSpec::Float)
        .summary("Add two non-negative numbers"),
    )?;

    let pet = RecordSpec::new("Pet")
        .field("name", TypeSpec::String)
        .field("tag", TypeSpec::option(TypeSpec::String));
    site.register(
        Method::new(
            "Petstore.echo",
            from_fn(|params| async move { Ok(Reply::new(params["pet"].clone())) }),
        )
        .param("pet", TypeSpec::Record(pet))
        .returns(TypeSpec::Any)
        .summary("Echo a pet record back"),
    )?;

    site.register(
        Method::new(
            "Petstore.remove",
            from_fn(|params| async move {
                let name = params["name"].as_str().unwrap_or_default();
                if name == "cerberus" {
                    return Err(CustomError::new("pet_error", "this one stays")
                        .refine("guard_dog_error")
                        .into());
                }
                Ok(Reply::new(json!({"removed": name})).with_status(201))
            }),
        )
        .param("name", TypeSpec::String)
        .returns(TypeSpec::Any)
        .error(ErrorDoc::new(4001, "pet cannot be removed")),
    )?;
    site.register_error_handler("guard_dog_error", |e: &CustomError| {
        ErrorReply::new(json!({"reason": e.message})).with_status(409)
    });

    // Admin methods live on their own blueprint with scoped error handling
    let mut admin = Blueprint::new("admin");
    admin.register(
        Method::new("admin.reset", from_typed_fn(|_: ()| async move { Ok(true) }))
            .returns(TypeSpec::Bool)
            .requires_auth()
            .notification(false),
    )?;
    site.register_blueprint(admin);
    site.set_auth_backend(backend_from_fn(|user, password| {
        user == "admin" && password == "hunter2"
    }));

    let app = jroh::server::http::mount(Arc::new(site));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
    tracing::info!("petstore listening on http://127.0.0.1:5000/api");
    axum::serve(listener, app).await?;
    Ok(())
}
