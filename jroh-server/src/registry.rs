//! The method registry ("site")
//!
//! A [`Site`] owns the process-wide name → method table plus a separate
//! error-kind → handler table for custom error mapping. Registration is
//! last-write-wins and happens at application start-up; in steady state the
//! tables are read-only, shared across concurrent requests without locks.
//!
//! The built-in `rpc.describe` method is always present: it reports the
//! structured self-description of every registered method and always
//! reflects the current table.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::{from_typed_fn, Method, ServiceConfig, Site};
//! use jroh_core::schema::TypeSpec;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct SumParams { a: f64, b: f64 }
//!
//! let mut site = Site::new(ServiceConfig::new("/api"));
//! site.register(
//!     Method::new("App.sum", from_typed_fn(|p: SumParams| async move { Ok(p.a + p.b) }))
//!         .param("a", TypeSpec::Float)
//!         .param("b", TypeSpec::Float)
//!         .returns(TypeSpec::Float),
//! ).unwrap();
//!
//! assert!(site.has_method("App.sum"));
//! assert!(site.has_method("rpc.describe"));
//! ```

use crate::auth::AuthBackend;
use crate::blueprint::Blueprint;
use crate::config::ServiceConfig;
use crate::handler::{CustomError, Handler};
use crate::method::{Method, MethodDescriptor, RegistrationError, Signature};
use jroh_core::schema::TypeSpec;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Public name of the built-in description method
pub const DESCRIBE_METHOD_NAME: &str = "rpc.describe";

/// What a registered error handler maps a domain error to
///
/// The payload becomes the `data` of the generic server-error envelope;
/// the status (default 500) becomes the HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReply {
    pub payload: Value,
    pub status: Option<u16>,
}

impl ErrorReply {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// A registered error handler
pub type ErrorHandlerFn = Arc<dyn Fn(&CustomError) -> ErrorReply + Send + Sync>;

/// Error-kind → handler table with hierarchy-walking lookup
#[derive(Clone, Default)]
pub struct ErrorHandlerTable {
    handlers: HashMap<String, ErrorHandlerFn>,
}

impl ErrorHandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: impl Into<String>, handler: F)
    where
        F: Fn(&CustomError) -> ErrorReply + Send + Sync + 'static,
    {
        self.handlers.insert(kind.into(), Arc::new(handler));
    }

    /// Resolve the most specific handler for an error
    ///
    /// Walks the error's kind chain most-derived-first, so a handler
    /// registered for a derived kind beats one for its ancestor.
    pub fn resolve(&self, error: &CustomError) -> Option<ErrorHandlerFn> {
        error
            .kind_chain()
            .find_map(|kind| self.handlers.get(kind).cloned())
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// A method table entry: frozen descriptor + shared handler
#[derive(Clone)]
pub(crate) struct RegisteredMethod {
    pub descriptor: Arc<MethodDescriptor>,
    pub handler: Arc<dyn Handler>,
    /// Error handlers of the registry that defined this method; `None`
    /// means the owning site's own table applies
    pub scoped_errors: Option<Arc<ErrorHandlerTable>>,
}

/// The method registry
///
/// Constructed once per application (blueprints are merged in at wiring
/// time) and read-only while serving. Registration must complete before
/// dispatch begins; the registry takes no locks of its own.
pub struct Site {
    config: ServiceConfig,
    uuid: Uuid,
    methods: HashMap<String, RegisteredMethod>,
    order: Vec<String>,
    error_handlers: Arc<ErrorHandlerTable>,
    auth: Option<Arc<dyn AuthBackend>>,
}

impl Site {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            uuid: Uuid::new_v4(),
            methods: HashMap::new(),
            order: Vec::new(),
            error_handlers: Arc::new(ErrorHandlerTable::new()),
            auth: None,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The service instance id reported by `rpc.describe`
    pub fn urn(&self) -> String {
        format!("urn:uuid:{}", self.uuid)
    }

    /// Register a method; an existing entry under the same name is
    /// replaced (last write wins, no error)
    pub fn register(&mut self, method: Method) -> Result<(), RegistrationError> {
        let descriptor = MethodDescriptor::freeze(
            &method,
            self.config.default_validate,
            self.config.default_notification,
        )?;
        tracing::debug!(method = %descriptor.name, "method registered");
        self.insert(
            descriptor.name.clone(),
            RegisteredMethod {
                descriptor: Arc::new(descriptor),
                handler: Arc::from(method.handler),
                scoped_errors: None,
            },
        );
        Ok(())
    }

    /// Associate an error kind with a handler for this site's own methods
    pub fn register_error_handler<F>(&mut self, kind: impl Into<String>, handler: F)
    where
        F: Fn(&CustomError) -> ErrorReply + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.error_handlers).register(kind, handler);
    }

    /// Install the pluggable credential backend
    pub fn set_auth_backend(&mut self, backend: Arc<dyn AuthBackend>) {
        self.auth = Some(backend);
    }

    pub(crate) fn auth_backend(&self) -> Option<&Arc<dyn AuthBackend>> {
        self.auth.as_ref()
    }

    /// Merge a blueprint's method table into this site
    ///
    /// Shallow union, later registration wins on name collision. The
    /// blueprint's error handlers stay scoped to the methods it defined.
    pub fn register_blueprint(&mut self, blueprint: Blueprint) {
        let (methods, error_handlers) = blueprint.into_parts();
        let scoped = Arc::new(error_handlers);
        for (name, mut registered) in methods {
            registered.scoped_errors = Some(Arc::clone(&scoped));
            self.insert(name, registered);
        }
    }

    fn insert(&mut self, name: String, registered: RegisteredMethod) {
        if !self.methods.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.methods.insert(name, registered);
    }

    pub fn has_method(&self, name: &str) -> bool {
        name == DESCRIBE_METHOD_NAME || self.methods.contains_key(name)
    }

    /// All public method names in registration order, the built-in
    /// `rpc.describe` first (unless a registration replaced it)
    pub fn method_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.order.len() + 1);
        if !self.methods.contains_key(DESCRIBE_METHOD_NAME) {
            names.push(DESCRIBE_METHOD_NAME.to_string());
        }
        names.extend(self.order.iter().cloned());
        names
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RegisteredMethod> {
        self.methods.get(name)
    }

    /// The error-handler table in force for a given method
    pub(crate) fn errors_for<'a>(&'a self, method: &'a RegisteredMethod) -> &'a ErrorHandlerTable {
        method
            .scoped_errors
            .as_deref()
            .unwrap_or(&self.error_handlers)
    }

    /// The synthetic descriptor of the built-in `rpc.describe`
    pub(crate) fn describe_descriptor() -> MethodDescriptor {
        MethodDescriptor {
            name: DESCRIBE_METHOD_NAME.to_string(),
            signature: Signature {
                params: Vec::new(),
                returns: Some(TypeSpec::Any),
            },
            validate: true,
            notification: false,
            requires_auth: false,
            extra_params: false,
            summary: Some("Service self-description".to_string()),
            description: None,
            tags: Vec::new(),
            deprecated: false,
            errors: Vec::new(),
            examples: Vec::new(),
        }
    }
}
