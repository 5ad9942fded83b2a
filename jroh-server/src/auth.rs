//! Pluggable credential authentication
//!
//! Methods registered with `requires_auth()` expect the caller to prepend
//! `username` and `password` parameters - positionally (the first two array
//! elements) or by name. The dispatcher extracts them before binding the
//! remaining parameters and consults the site's [`AuthBackend`]; a failed
//! or missing credential check fails the call with an
//! `InvalidCredentialsError` before the handler ever runs.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::auth::{backend_from_fn, AuthBackend};
//!
//! let backend = backend_from_fn(|username, password| {
//!     username == "admin" && password == "hunter2"
//! });
//! ```

use async_trait::async_trait;
use jroh_core::RpcError;
use serde_json::Value;
use std::sync::Arc;

/// The credential-check contract consumed by the dispatcher
///
/// Implementations decide what a username/password pair means - a user
/// table, an LDAP bind, a constant-time token compare. The dispatcher only
/// cares about the boolean.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn check(&self, username: &str, password: &str) -> bool;
}

struct FnAuthBackend<F: Fn(&str, &str) -> bool + Send + Sync> {
    func: F,
}

#[async_trait]
impl<F: Fn(&str, &str) -> bool + Send + Sync> AuthBackend for FnAuthBackend<F> {
    async fn check(&self, username: &str, password: &str) -> bool {
        (self.func)(username, password)
    }
}

/// Wrap a plain predicate as an [`AuthBackend`]
pub fn backend_from_fn<F>(func: F) -> Arc<dyn AuthBackend>
where
    F: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    Arc::new(FnAuthBackend { func })
}

/// Extracted credentials plus the remaining parameter value
#[derive(Debug)]
pub(crate) struct Credentials {
    pub username: String,
    pub password: String,
    pub rest: Value,
}

/// Split the leading credentials off a raw `params` value
///
/// Positional params yield their first two elements; named params yield
/// the `username`/`password` keys. Anything else (absent params,
/// non-string credentials) is a credential failure.
pub(crate) fn extract_credentials(params: Value) -> Result<Credentials, RpcError> {
    let missing =
        || RpcError::invalid_credentials().with_detail("missing 'username' and 'password' parameters");

    match params {
        Value::Array(mut items) => {
            if items.len() < 2 {
                return Err(missing());
            }
            let rest = items.split_off(2);
            let password = as_string(items.pop())?;
            let username = as_string(items.pop())?;
            Ok(Credentials {
                username,
                password,
                rest: Value::Array(rest),
            })
        }
        Value::Object(mut entries) => {
            let username = as_string(entries.remove("username"))?;
            let password = as_string(entries.remove("password"))?;
            Ok(Credentials {
                username,
                password,
                rest: Value::Object(entries),
            })
        }
        _ => Err(missing()),
    }
}

fn as_string(value: Option<Value>) -> Result<String, RpcError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        _ => Err(RpcError::invalid_credentials()
            .with_detail("credential parameters must be strings")),
    }
}
