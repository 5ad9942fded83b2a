//! Blueprints: modular sub-registries
//!
//! A [`Blueprint`] is an independently built method table that merges into
//! a parent [`Site`](crate::Site) at application-wiring time. The merge is
//! a shallow union - later registration wins on a name collision - and the
//! blueprint's error handlers stay scoped: they only apply to errors raised
//! by the blueprint's own methods.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::{from_typed_fn, Blueprint, Method, ServiceConfig, Site};
//! use jroh_core::schema::TypeSpec;
//!
//! let mut users = Blueprint::new("users");
//! users.register(
//!     Method::new("users.count", from_typed_fn(|_: ()| async { Ok(0i64) }))
//!         .returns(TypeSpec::Int),
//! ).unwrap();
//!
//! let mut site = Site::new(ServiceConfig::new("/api"));
//! site.register_blueprint(users);
//! assert!(site.has_method("users.count"));
//! ```

use crate::handler::CustomError;
use crate::method::{Method, MethodDescriptor, RegistrationError};
use crate::registry::{ErrorHandlerTable, ErrorReply, RegisteredMethod};
use std::sync::Arc;

/// A modular sub-registry built apart from the application site
///
/// Blueprints resolve their own option defaults at registration time (a
/// blueprint is built before it knows its parent), so construct with
/// [`Blueprint::with_defaults`] when the parent's defaults differ.
pub struct Blueprint {
    name: String,
    default_validate: bool,
    default_notification: bool,
    methods: Vec<(String, RegisteredMethod)>,
    error_handlers: ErrorHandlerTable,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_defaults(name, true, true)
    }

    pub fn with_defaults(
        name: impl Into<String>,
        default_validate: bool,
        default_notification: bool,
    ) -> Self {
        Self {
            name: name.into(),
            default_validate,
            default_notification,
            methods: Vec::new(),
            error_handlers: ErrorHandlerTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a method on this blueprint
    ///
    /// Annotation coverage is enforced here, at blueprint-build time, not
    /// deferred to the merge.
    pub fn register(&mut self, method: Method) -> Result<(), RegistrationError> {
        let descriptor = MethodDescriptor::freeze(
            &method,
            self.default_validate,
            self.default_notification,
        )?;
        tracing::debug!(blueprint = %self.name, method = %descriptor.name, "blueprint method registered");
        self.methods.push((
            descriptor.name.clone(),
            RegisteredMethod {
                descriptor: Arc::new(descriptor),
                handler: Arc::from(method.handler),
                scoped_errors: None,
            },
        ));
        Ok(())
    }

    /// Associate an error kind with a handler, scoped to this blueprint's
    /// methods
    pub fn register_error_handler<F>(&mut self, kind: impl Into<String>, handler: F)
    where
        F: Fn(&CustomError) -> ErrorReply + Send + Sync + 'static,
    {
        self.error_handlers.register(kind, handler);
    }

    pub(crate) fn into_parts(self) -> (Vec<(String, RegisteredMethod)>, ErrorHandlerTable) {
        (self.methods, self.error_handlers)
    }
}
