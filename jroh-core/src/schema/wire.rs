//! The wire-type taxonomy
//!
//! Every type descriptor maps to exactly one of six canonical wire types -
//! the vocabulary the service description speaks. Classification walks the
//! canonical precedence order (String, Number, Object, Array, Boolean,
//! Null), first match wins. The generic object-like catch-alls sit after
//! the specific string/numeric checks so that compound descriptors are not
//! misclassified, and Boolean matches the boolean descriptor exactly - a
//! bool never classifies as Number.
//!
//! Classification never fails: a descriptor nothing claims falls back to
//! the caller-supplied default (`Object` for [`classify`]).
//!
//! # Examples
//!
//! ```rust
//! use jroh_core::schema::{classify, TypeSpec, WireType};
//!
//! assert_eq!(classify(&TypeSpec::String), WireType::String);
//! assert_eq!(classify(&TypeSpec::Int), WireType::Number);
//! assert_eq!(classify(&TypeSpec::Bool), WireType::Boolean);
//! assert_eq!(classify(&TypeSpec::option(TypeSpec::Float)), WireType::Number);
//! ```

use super::TypeSpec;
use serde_json::Value;
use std::fmt;

/// One of the six canonical wire types
///
/// Equality is plain enum identity; the canonical ordering used by
/// classification lives in [`WireType::CANONICAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Text and byte-sequence types
    String,
    /// Integers, floats and decimals (never booleans)
    Number,
    /// Mappings, records and the universal any-type
    Object,
    /// Lists, sets and fixed-arity tuples
    Array,
    /// The boolean type exactly
    Boolean,
    /// Null and the never-returns marker
    Null,
}

impl WireType {
    /// The canonical precedence order used by classification
    pub const CANONICAL: [WireType; 6] = [
        WireType::String,
        WireType::Number,
        WireType::Object,
        WireType::Array,
        WireType::Boolean,
        WireType::Null,
    ];

    /// The wire-type name as it appears in service descriptions
    pub fn name(&self) -> &'static str {
        match self {
            WireType::String => "String",
            WireType::Number => "Number",
            WireType::Object => "Object",
            WireType::Array => "Array",
            WireType::Boolean => "Boolean",
            WireType::Null => "Null",
        }
    }

    /// The lowercased primitive name used by the OpenRPC export
    pub fn openrpc_name(&self) -> &'static str {
        match self {
            WireType::String => "string",
            WireType::Number => "number",
            WireType::Object => "object",
            WireType::Array => "array",
            WireType::Boolean => "boolean",
            WireType::Null => "null",
        }
    }

    /// Whether this wire type subsumes the given descriptor
    ///
    /// Wrapper shapes (optional, union, annotated, type variable, literal)
    /// resolve through their content; a union only matches when every
    /// non-null arm matches.
    pub fn matches(&self, spec: &TypeSpec) -> bool {
        match spec {
            TypeSpec::Annotated(inner, _) => self.matches(inner),
            TypeSpec::Option(inner) => self.matches(inner),
            TypeSpec::Union(arms) => {
                let non_null: Vec<&TypeSpec> =
                    arms.iter().filter(|a| !matches!(a, TypeSpec::Null)).collect();
                !non_null.is_empty() && non_null.iter().all(|a| self.matches(a))
            }
            TypeSpec::TypeVar(tv) => match (&tv.bound, tv.constraints.is_empty()) {
                (Some(bound), _) => self.matches(bound),
                (None, false) => tv.constraints.iter().all(|c| self.matches(c)),
                (None, true) => *self == WireType::Object,
            },
            TypeSpec::Literal(values) => {
                !values.is_empty() && values.iter().all(|v| self.matches_value(v))
            }
            TypeSpec::String | TypeSpec::Bytes => *self == WireType::String,
            TypeSpec::Int | TypeSpec::Float | TypeSpec::Decimal => *self == WireType::Number,
            TypeSpec::Map(_, _) | TypeSpec::Record(_) | TypeSpec::Any | TypeSpec::Unknown => {
                *self == WireType::Object
            }
            TypeSpec::List(_) | TypeSpec::Tuple(_) | TypeSpec::Set(_) => *self == WireType::Array,
            TypeSpec::Bool => *self == WireType::Boolean,
            TypeSpec::Null | TypeSpec::NoReturn => *self == WireType::Null,
            // Enumerations have no structural claim of their own; they fall
            // through to the classification fallback
            TypeSpec::Enum(_) => false,
        }
    }

    fn matches_value(&self, value: &Value) -> bool {
        match value {
            Value::String(_) => *self == WireType::String,
            Value::Number(_) => *self == WireType::Number,
            Value::Bool(_) => *self == WireType::Boolean,
            Value::Null => *self == WireType::Null,
            Value::Array(_) => *self == WireType::Array,
            Value::Object(_) => *self == WireType::Object,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a descriptor, defaulting to `Object` for exotic constructs
pub fn classify(spec: &TypeSpec) -> WireType {
    classify_or(spec, WireType::Object)
}

/// Classify a descriptor with a caller-supplied fallback
///
/// Walks [`WireType::CANONICAL`] in order; the first wire type that
/// subsumes the descriptor wins. Never fails.
pub fn classify_or(spec: &TypeSpec, fallback: WireType) -> WireType {
    WireType::CANONICAL
        .iter()
        .copied()
        .find(|w| w.matches(spec))
        .unwrap_or(fallback)
}
