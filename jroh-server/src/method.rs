//! Method definitions: signatures, descriptors and registration options
//!
//! A [`Method`] pairs a handler with its declared [`Signature`] and
//! metadata. Registration turns it into an immutable [`MethodDescriptor`]
//! owned by the registry - the descriptor never changes afterwards;
//! re-registering the same name replaces the whole entry.
//!
//! # Annotation coverage is all-or-nothing
//!
//! With `validate = true` (the default) a method must declare a type for
//! every parameter *and* its return; anything less fails registration with
//! `no type annotations present to: <name>`. With `validate = false` the
//! check is skipped and everything defaults to the universal any-type.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::{from_typed_fn, Method};
//! use jroh_core::schema::TypeSpec;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct SumParams { a: f64, b: f64 }
//!
//! let method = Method::new("App.sum", from_typed_fn(|p: SumParams| async move { Ok(p.a + p.b) }))
//!     .param("a", TypeSpec::Float)
//!     .param("b", TypeSpec::Float)
//!     .returns(TypeSpec::Float)
//!     .summary("Add two numbers");
//! ```

use crate::handler::Handler;
use jroh_core::schema::TypeSpec;
use serde_json::Value;
use thiserror::Error;

/// Registration failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Validation is on and the signature is not fully annotated
    #[error("no type annotations present to: {0}")]
    MissingAnnotations(String),
    /// The public name is empty or whitespace
    #[error("method name is required")]
    EmptyName,
}

/// One declared parameter of a method signature
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    /// `None` marks an unannotated parameter; legal only without validation
    pub spec: Option<TypeSpec>,
}

/// A method's declared parameter list and return type
///
/// Parameters keep declaration order - positional binding maps array
/// params onto them in this order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Param>,
    pub returns: Option<TypeSpec>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every parameter and the return carry a type descriptor
    pub fn fully_annotated(&self) -> bool {
        self.returns.as_ref().is_some_and(|r| !matches!(r, TypeSpec::Unknown))
            && self
                .params
                .iter()
                .all(|p| p.spec.as_ref().is_some_and(|s| !matches!(s, TypeSpec::Unknown)))
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// A declared (documentation-only) error of a method
///
/// Declared errors describe what a method may fail with; they do not
/// change runtime behavior unless the kind is also registered as an
/// error handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDoc {
    pub code: i32,
    pub message: String,
    pub http_status: u16,
    pub data: Option<Value>,
}

impl ErrorDoc {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            http_status: 500,
            data: None,
        }
    }
}

/// A usage example attached to a method
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExampleDoc {
    pub name: String,
    pub summary: Option<String>,
    pub params: Vec<(String, Value)>,
    pub returns: Option<Value>,
}

impl ExampleDoc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.push((name.into(), value));
        self
    }

    pub fn returns(mut self, value: Value) -> Self {
        self.returns = Some(value);
        self
    }
}

/// A method being registered: handler + signature + options + metadata
///
/// Built fluently and handed to `Site::register` (or a blueprint), which
/// validates it and freezes it into a [`MethodDescriptor`].
pub struct Method {
    pub(crate) name: String,
    pub(crate) handler: Box<dyn Handler>,
    pub(crate) signature: Signature,
    pub(crate) validate: Option<bool>,
    pub(crate) notification: Option<bool>,
    pub(crate) requires_auth: bool,
    pub(crate) extra_params: bool,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) deprecated: bool,
    pub(crate) errors: Vec<ErrorDoc>,
    pub(crate) examples: Vec<ExampleDoc>,
}

impl Method {
    /// Start defining a method with the given public (dotted) name
    pub fn new(name: impl Into<String>, handler: Box<dyn Handler>) -> Self {
        Self {
            name: name.into(),
            handler,
            signature: Signature::new(),
            validate: None,
            notification: None,
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

    /// Declare a typed parameter (declaration order matters)
    pub fn param(mut self, name: impl Into<String>, spec: TypeSpec) -> Self {
        self.signature.params.push(Param {
            name: name.into(),
            spec: Some(spec),
        });
        self
    }

    /// Declare a parameter without a type
    ///
    /// Only legal together with `validate(false)`.
    pub fn param_untyped(mut self, name: impl Into<String>) -> Self {
        self.signature.params.push(Param {
            name: name.into(),
            spec: None,
        });
        self
    }

    /// Declare the return type
    pub fn returns(mut self, spec: TypeSpec) -> Self {
        self.signature.returns = Some(spec);
        self
    }

    /// Override the per-method `validate` option
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = Some(validate);
        self
    }

    /// Override whether the method accepts notification requests
    pub fn notification(mut self, notification: bool) -> Self {
        self.notification = Some(notification);
        self
    }

    /// Require credential authentication before invocation
    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Accept (and pass through) named parameters beyond the signature
    pub fn allow_extra_params(mut self) -> Self {
        self.extra_params = true;
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Attach a declared error (documentation only)
    pub fn error(mut self, error: ErrorDoc) -> Self {
        self.errors.push(error);
        self
    }

    /// Attach a usage example
    pub fn example(mut self, example: ExampleDoc) -> Self {
        self.examples.push(example);
        self
    }
}

/// The registry's immutable record of a registered method
///
/// Created once at registration and never mutated; re-registering the same
/// public name replaces the descriptor wholesale.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub signature: Signature,
    pub validate: bool,
    pub notification: bool,
    pub requires_auth: bool,
    pub extra_params: bool,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub errors: Vec<ErrorDoc>,
    pub examples: Vec<ExampleDoc>,
}

impl MethodDescriptor {
    /// Freeze a [`Method`] into a descriptor, resolving option defaults
    /// and enforcing the annotation-coverage rule
    pub(crate) fn freeze(
        method: &Method,
        default_validate: bool,
        default_notification: bool,
    ) -> Result<Self, RegistrationError> {
        if method.name.trim().is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        let validate = method.validate.unwrap_or(default_validate);
        if validate && !method.signature.fully_annotated() {
            return Err(RegistrationError::MissingAnnotations(method.name.clone()));
        }
        Ok(Self {
            name: method.name.clone(),
            signature: method.signature.clone(),
            validate,
            notification: method.notification.unwrap_or(default_notification),
            requires_auth: method.requires_auth,
            extra_params: method.extra_params,
            summary: method.summary.clone(),
            description: method.description.clone(),
            tags: method.tags.clone(),
            deprecated: method.deprecated,
            errors: method.errors.clone(),
            examples: method.examples.clone(),
        })
    }

    /// The effective descriptor of a parameter, `Any` when unannotated
    pub fn param_spec(&self, index: usize) -> TypeSpec {
        self.signature
            .params
            .get(index)
            .and_then(|p| p.spec.clone())
            .unwrap_or(TypeSpec::Any)
    }
}
