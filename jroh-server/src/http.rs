//! HTTP mount for a [`Site`]
//!
//! Builds an axum `Router` exposing:
//!
//! - `POST <path>` - the dispatch endpoint. Accepts `application/json`,
//!   `application/json-rpc`, `application/jsonrequest` and any
//!   `application/*+json` body; anything else answers with a parse error
//!   naming the offending mime type.
//! - `GET <path>/<method>` - a convenience single-call form: the query
//!   string becomes named params (values JSON-decoded where possible),
//!   dispatched as an id-less call that is nevertheless forced to respond.
//!
//! The dispatcher's `(body, status, headers)` outcome maps directly onto
//! the HTTP response; a 204 outcome produces an empty body.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jroh_server::{http, ServiceConfig, Site};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let site = Arc::new(Site::new(ServiceConfig::new("/api")));
//!     let app = http::mount(site);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

use crate::dispatch::HttpReply;
use crate::registry::Site;
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::response::Response as AxumResponse;
use axum::routing::{get, post};
use axum::Router;
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use jroh_core::{Id, Request, Response, RpcError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Build the dispatch router, to be nested at the site's mount path
pub fn router(site: Arc<Site>) -> Router {
    Router::new()
        .route("/", post(handle_post))
        .route("/{method}", get(handle_get))
        .with_state(site)
}

/// Build a complete application router nested at the configured path
pub fn mount(site: Arc<Site>) -> Router {
    let path = site.config().path.clone();
    Router::new().nest(&path, router(site))
}

/// The accepted JSON content negotiation rule
fn is_json_mime(mime: &str) -> bool {
    matches!(
        mime,
        "application/json" | "application/json-rpc" | "application/jsonrequest"
    ) || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn request_mime(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

async fn handle_post(
    State(site): State<Arc<Site>>,
    headers: HeaderMap,
    body: Bytes,
) -> AxumResponse {
    let mime = request_mime(&headers);
    if !is_json_mime(&mime) {
        tracing::warn!(%mime, "invalid mimetype");
        let error = RpcError::parse_error().with_detail(format!(
            "Invalid mime type for JSON: {}, use header Content-Type: application/json",
            mime
        ));
        let status = error.http_status;
        return build_response(HttpReply {
            body: serde_json::to_value(Response::error(error, Id::Null)).ok(),
            status,
            headers: Vec::new(),
        });
    }

    build_response(site.dispatch_request(&body).await)
}

async fn handle_get(
    State(site): State<Arc<Site>>,
    Path(method): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> AxumResponse {
    let mut params = serde_json::Map::new();
    for (key, raw) in query {
        params.insert(key, query_value(&raw));
    }
    let request = Request {
        jsonrpc: None,
        method,
        params: Some(Value::Object(params)),
        id: None,
    };
    build_response(site.dispatch_single(request, true).await)
}

/// Decode a query value as JSON where possible, else keep it a string
fn query_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn build_response(reply: HttpReply) -> AxumResponse {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = http::Response::builder().status(status);

    for (name, value) in &reply.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            builder = builder.header(name, value);
        }
    }

    let result = match reply.body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap_or_default())),
        None => builder.body(Body::empty()),
    };
    result.unwrap_or_else(|_| {
        let mut fallback = AxumResponse::new(Body::empty());
        *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mime_rule() {
        assert!(is_json_mime("application/json"));
        assert!(is_json_mime("application/json-rpc"));
        assert!(is_json_mime("application/jsonrequest"));
        assert!(is_json_mime("application/vnd.api+json"));
        assert!(!is_json_mime("text/plain"));
        assert!(!is_json_mime("application/xml"));
        assert!(!is_json_mime(""));
    }

    #[test]
    fn test_query_value_decoding() {
        assert_eq!(query_value("1"), serde_json::json!(1));
        assert_eq!(query_value("true"), serde_json::json!(true));
        assert_eq!(query_value("[1,2]"), serde_json::json!([1, 2]));
        assert_eq!(query_value("plain text"), serde_json::json!("plain text"));
    }

    #[test]
    fn test_request_mime_strips_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert_eq!(request_mime(&headers), "application/json");
    }
}
