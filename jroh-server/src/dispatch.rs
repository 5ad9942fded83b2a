//! The request dispatcher
//!
//! Drives one HTTP body through the full pipeline: decode → shape-check →
//! resolve → notification policy → bind & coerce → authenticate → invoke →
//! interpret the reply → assemble the response. Batches dispatch their
//! members sequentially in array order - that keeps header merging and
//! per-element error isolation deterministic - and the only suspension
//! point in the pipeline is the handler invocation itself.
//!
//! Every failure yields a well-formed JSON-RPC error envelope; only the
//! top-level not-JSON and empty-batch cases answer with `id: null`.
//!
//! # HTTP status mapping
//!
//! - 200: normal result (and every batch with at least one response)
//! - 204: all-notification batch or a single successful notification
//! - 400: parse / invalid-request / invalid-params / method-not-found
//! - 500: uncaught handler errors (unless an error handler or custom
//!   error supplies its own status)

use crate::auth;
use crate::handler::{HandlerError, Reply};
use crate::registry::{RegisteredMethod, Site, DESCRIBE_METHOD_NAME};
use crate::method::MethodDescriptor;
use jroh_core::schema::load;
use jroh_core::{codec, Error, Id, Message, Request, Response, RpcError};
use serde_json::Value;

/// The HTTP-level outcome of dispatching one body
///
/// `body: None` means an empty 204 response. The surrounding HTTP
/// framework turns this into its own response type.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub body: Option<Value>,
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl HttpReply {
    fn from_error(error: RpcError) -> Self {
        let status = error.http_status;
        Self {
            body: Some(response_value(Response::error(error, Id::Null))),
            status,
            headers: Vec::new(),
        }
    }
}

/// Serialize a response, falling back to a bare server-error envelope
fn response_value(resp: Response) -> Value {
    serde_json::to_value(&resp).unwrap_or_else(|_| {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"name": "ServerError", "code": -32000, "message": "Server error", "data": null}
        })
    })
}

/// Map an application error onto its wire form
fn rpc_of(error: Error) -> RpcError {
    match error {
        Error::Rpc(e) => e,
        Error::Load(e) => RpcError::invalid_params().with_detail(e.message),
        other => RpcError::server_error().with_detail(other.to_string()),
    }
}

/// Merge headers in array order, later entries winning on key collision
fn merge_headers(into: &mut Vec<(String, String)>, from: Vec<(String, String)>) {
    for (name, value) in from {
        if let Some(existing) = into
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            existing.1 = value;
        } else {
            into.push((name, value));
        }
    }
}

/// Best-effort id of a raw batch element, for error correlation
fn element_id(element: &Value) -> Id {
    match element.get("id") {
        Some(Value::String(s)) => Id::String(s.clone()),
        Some(Value::Number(n)) => n.as_i64().map(Id::Number).unwrap_or(Id::Null),
        _ => Id::Null,
    }
}

/// The resolved target of one request
enum Target<'a> {
    Registered(&'a RegisteredMethod),
    Describe(MethodDescriptor),
}

impl Target<'_> {
    fn descriptor(&self) -> &MethodDescriptor {
        match self {
            Target::Registered(m) => m.descriptor.as_ref(),
            Target::Describe(d) => d,
        }
    }
}

impl Site {
    /// Dispatch one raw HTTP body and assemble the HTTP-level reply
    #[tracing::instrument(skip(self, body), fields(bytes = body.len()))]
    pub async fn dispatch_request(&self, body: &[u8]) -> HttpReply {
        match codec::decode(body) {
            Ok(Message::Single(request)) => self.dispatch_single(request, false).await,
            Ok(Message::Batch(elements)) => self.dispatch_batch(elements).await,
            Err(error) => {
                tracing::warn!("undispatchable body");
                HttpReply::from_error(rpc_of(error))
            }
        }
    }

    /// Dispatch a single parsed request
    ///
    /// `force_respond` makes a notification-shaped request answer anyway -
    /// the GET convenience form uses it.
    pub async fn dispatch_single(&self, request: Request, force_respond: bool) -> HttpReply {
        let (response, status, headers) = self.handle_request(request, force_respond).await;
        match response {
            Some(resp) => HttpReply {
                body: Some(response_value(resp)),
                status,
                headers,
            },
            None => HttpReply {
                body: None,
                status: 204,
                headers,
            },
        }
    }

    /// Dispatch a batch sequentially, in array order
    ///
    /// Malformed elements produce their own `id: null` error entries in
    /// place; notifications contribute headers but no entry. A batch with
    /// no response-worthy entries is HTTP 204 with no body, anything else
    /// is HTTP 200.
    #[tracing::instrument(skip(self, elements), fields(batch_size = elements.len()))]
    async fn dispatch_batch(&self, elements: Vec<Value>) -> HttpReply {
        let mut responses: Vec<Value> = Vec::new();
        let mut headers: Vec<(String, String)> = Vec::new();

        for element in elements {
            // Malformed elements still echo their id when one is present
            let fallback_id = element_id(&element);
            let (response, _status, element_headers) = match codec::decode_element(element) {
                Ok(request) => self.handle_request(request, false).await,
                Err(error) => {
                    let rpc = rpc_of(error);
                    (Some(Response::error(rpc, fallback_id)), 400, Vec::new())
                }
            };
            merge_headers(&mut headers, element_headers);
            if let Some(resp) = response {
                responses.push(response_value(resp));
            }
        }

        tracing::debug!(response_count = responses.len(), "batch dispatch completed");
        if responses.is_empty() {
            HttpReply {
                body: None,
                status: 204,
                headers,
            }
        } else {
            HttpReply {
                body: Some(Value::Array(responses)),
                status: 200,
                headers,
            }
        }
    }

    /// Run one request through the pipeline and shape its response entry
    ///
    /// Returns `(response, status, headers)`; the response is `None` only
    /// for a successful notification.
    async fn handle_request(
        &self,
        request: Request,
        force_respond: bool,
    ) -> (Option<Response>, u16, Vec<(String, String)>) {
        let id = request.response_id();
        let respond = force_respond || !request.is_notification();

        match self.invoke_request(&request, force_respond).await {
            Ok(reply) => {
                if respond {
                    let status = reply.status_or_default();
                    (Some(Response::success(reply.body, id)), status, reply.headers)
                } else {
                    (None, 204, reply.headers)
                }
            }
            Err(error) => {
                tracing::warn!(method = %request.method, code = error.code, "dispatch error");
                let status = error.http_status;
                (Some(Response::error(error, id)), status, Vec::new())
            }
        }
    }

    /// The pipeline proper: resolve, check policy, bind, authenticate,
    /// invoke, interpret
    async fn invoke_request(&self, request: &Request, force_respond: bool) -> Result<Reply, RpcError> {
        let params = match &request.params {
            None => Value::Object(serde_json::Map::new()),
            Some(p @ (Value::Array(_) | Value::Object(_))) => p.clone(),
            Some(other) => {
                return Err(RpcError::invalid_params().with_detail(format!(
                    "Parameter structures are by-position (array) or by-name (object): {}",
                    other
                )))
            }
        };

        let target = match self.get(&request.method) {
            Some(method) => Target::Registered(method),
            None if request.method == DESCRIBE_METHOD_NAME => {
                Target::Describe(Site::describe_descriptor())
            }
            None => return Err(RpcError::method_not_found(&request.method)),
        };
        let descriptor = target.descriptor();

        if request.is_notification() && !force_respond && !descriptor.notification {
            return Err(RpcError::invalid_request().with_detail(format!(
                "The method '{}' doesn't allow Notification Request object (without an 'id' member)",
                descriptor.name
            )));
        }

        let params = if descriptor.requires_auth {
            let credentials = auth::extract_credentials(params)?;
            let backend = self.auth_backend().ok_or_else(|| {
                RpcError::server_error().with_detail("no authentication backend configured")
            })?;
            if !backend.check(&credentials.username, &credentials.password).await {
                return Err(RpcError::invalid_credentials());
            }
            credentials.rest
        } else {
            params
        };

        let bound = bind_params(descriptor, params)?;

        match target {
            Target::Describe(_) => {
                let body = serde_json::to_value(self.service_describe()).map_err(|e| {
                    RpcError::server_error().with_detail(e.to_string())
                })?;
                Ok(Reply::new(body))
            }
            Target::Registered(method) => match method.handler.call(bound).await {
                Ok(reply) => Ok(reply),
                Err(HandlerError::Rpc(error)) => Err(error),
                Err(HandlerError::Custom(error)) => {
                    match self.errors_for(method).resolve(&error) {
                        Some(handler) => {
                            let mapped = handler(&error);
                            Err(RpcError::server_error()
                                .with_data(mapped.payload)
                                .with_http_status(mapped.status.unwrap_or(500)))
                        }
                        None => Err(RpcError::server_error().with_detail(error.to_string())),
                    }
                }
            },
        }
    }
}

/// Map raw params onto the declared parameter names, loading each value
///
/// Positional arrays bind in declaration order with exact arity; named
/// objects bind by key, with unknown keys rejected unless the method opted
/// into openness. Missing named parameters bind as null and then stand or
/// fall with their descriptor's nullability.
fn bind_params(descriptor: &MethodDescriptor, params: Value) -> Result<Value, RpcError> {
    let declared = &descriptor.signature.params;

    // A non-validating method with no declared signature receives the raw
    // params value untouched
    if declared.is_empty() && !descriptor.validate {
        return Ok(params);
    }

    let mut bound = serde_json::Map::with_capacity(declared.len());

    match params {
        Value::Array(items) => {
            if items.len() > declared.len() {
                return Err(RpcError::invalid_params().with_detail(format!(
                    "{}() takes {} positional arguments but {} were given",
                    descriptor.name,
                    declared.len(),
                    items.len()
                )));
            }
            if items.len() < declared.len() {
                let missing = &declared[items.len()].name;
                return Err(RpcError::invalid_params().with_detail(format!(
                    "{}() missing a required argument: '{}'",
                    descriptor.name, missing
                )));
            }
            for (param, value) in declared.iter().zip(items) {
                bound.insert(param.name.clone(), value);
            }
        }
        Value::Object(mut entries) => {
            for param in declared {
                let value = entries.remove(&param.name).unwrap_or(Value::Null);
                bound.insert(param.name.clone(), value);
            }
            if let Some(unknown) = entries.keys().next() {
                if !descriptor.extra_params {
                    return Err(RpcError::invalid_params().with_detail(format!(
                        "{}() got an unexpected keyword argument '{}'",
                        descriptor.name, unknown
                    )));
                }
            }
            if descriptor.extra_params {
                for (key, value) in entries {
                    bound.insert(key, value);
                }
            }
        }
        other => {
            return Err(RpcError::invalid_params().with_detail(format!(
                "Parameter structures are by-position (array) or by-name (object): {}",
                other
            )))
        }
    }

    if descriptor.validate {
        for (index, param) in declared.iter().enumerate() {
            let spec = descriptor.param_spec(index);
            let raw = bound.remove(&param.name).unwrap_or(Value::Null);
            let loaded = load(&spec, raw)
                .map_err(|e| RpcError::invalid_params().with_detail(e.message))?;
            for constraint in spec.constraints() {
                constraint
                    .check(&param.name, &loaded)
                    .map_err(|e| RpcError::invalid_params().with_detail(e.message))?;
            }
            bound.insert(param.name.clone(), loaded);
        }
    }

    Ok(Value::Object(bound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::{Param, Signature};
    use jroh_core::schema::{Constraint, TypeSpec};
    use serde_json::json;

    fn descriptor(params: Vec<(&str, TypeSpec)>) -> MethodDescriptor {
        let method_params = params
            .into_iter()
            .map(|(name, spec)| Param {
                name: name.to_string(),
                spec: Some(spec),
            })
            .collect();
        MethodDescriptor {
            name: "m".to_string(),
            signature: Signature {
                params: method_params,
                returns: Some(TypeSpec::Any),
            },
            validate: true,
            notification: true,
            requires_auth: false,
            extra_params: false,
            summary: None,
            description: None,
            tags: Vec::new(),
            deprecated: false,
            errors: Vec::new(),
            examples: Vec::new(),
        }
    }

    #[test]
    fn test_bind_positional_in_declaration_order() {
        let d = descriptor(vec![("a", TypeSpec::Int), ("b", TypeSpec::Int)]);
        let bound = bind_params(&d, json!([1, 2])).unwrap();
        assert_eq!(bound, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_bind_positional_arity_errors() {
        let d = descriptor(vec![("a", TypeSpec::Int), ("b", TypeSpec::Int)]);

        let excess = bind_params(&d, json!([1, 2, 3])).unwrap_err();
        assert!(excess.data.unwrap()["message"]
            .as_str()
            .unwrap()
            .contains("takes 2 positional arguments but 3 were given"));

        let missing = bind_params(&d, json!([1])).unwrap_err();
        assert!(missing.data.unwrap()["message"]
            .as_str()
            .unwrap()
            .contains("missing a required argument: 'b'"));
    }

    #[test]
    fn test_bind_named_unknown_key() {
        let d = descriptor(vec![("a", TypeSpec::Int)]);
        let err = bind_params(&d, json!({"a": 1, "z": 2})).unwrap_err();
        assert!(err.data.unwrap()["message"]
            .as_str()
            .unwrap()
            .contains("unexpected keyword argument 'z'"));
    }

    #[test]
    fn test_bind_named_extra_allowed_when_open() {
        let mut d = descriptor(vec![("a", TypeSpec::Int)]);
        d.extra_params = true;
        let bound = bind_params(&d, json!({"a": 1, "z": 2})).unwrap();
        assert_eq!(bound, json!({"a": 1, "z": 2}));
    }

    #[test]
    fn test_bind_coercion_failure() {
        let d = descriptor(vec![("a", TypeSpec::Int)]);
        let err = bind_params(&d, json!({"a": "one"})).unwrap_err();
        assert_eq!(err.code, -32602);
    }

    #[test]
    fn test_bind_missing_named_nullability() {
        let d = descriptor(vec![("a", TypeSpec::option(TypeSpec::Int))]);
        let bound = bind_params(&d, json!({})).unwrap();
        assert_eq!(bound, json!({"a": null}));

        let strict = descriptor(vec![("a", TypeSpec::Int)]);
        assert!(bind_params(&strict, json!({})).is_err());
    }

    #[test]
    fn test_bind_runs_constraint_pass() {
        let d = descriptor(vec![(
            "a",
            TypeSpec::annotated(TypeSpec::Int, vec![Constraint::Minimum(10.0)]),
        )]);
        assert!(bind_params(&d, json!({"a": 12})).is_ok());
        let err = bind_params(&d, json!({"a": 3})).unwrap_err();
        assert!(err.data.unwrap()["message"]
            .as_str()
            .unwrap()
            .contains("greater than or equal to 10"));
    }

    #[test]
    fn test_bind_raw_passthrough_without_validation() {
        let mut d = descriptor(vec![]);
        d.validate = false;
        let bound = bind_params(&d, json!([1, "two"])).unwrap();
        assert_eq!(bound, json!([1, "two"]));
    }

    #[test]
    fn test_merge_headers_later_wins() {
        let mut headers = vec![("X-Tag".to_string(), "a".to_string())];
        merge_headers(
            &mut headers,
            vec![
                ("x-tag".to_string(), "b".to_string()),
                ("X-Other".to_string(), "c".to_string()),
            ],
        );
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].1, "b");
        assert_eq!(headers[1].1, "c");
    }
}
