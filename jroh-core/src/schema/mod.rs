//! Schema engine: type descriptors, wire-type taxonomy, loading, constraints
//!
//! JSON-RPC methods in jroh declare their parameter and return types with an
//! explicit descriptor DSL instead of runtime reflection. A [`TypeSpec`] is
//! built once at registration time and drives three things:
//!
//! 1. **Classification** ([`wire`]): every descriptor maps to one of the six
//!    canonical wire types (String, Number, Object, Array, Boolean, Null)
//!    used by the service description.
//! 2. **Loading** ([`load`]): raw JSON-decoded parameter values are
//!    validated and normalized against their descriptor before a handler
//!    runs. Structural types (records, tuples, maps) reconstruct by field.
//! 3. **Constraints** ([`constraint`]): value facets (minimum, pattern,
//!    required, ...) run as a secondary pass over already-loaded values and
//!    surface in the service description.
//!
//! # Examples
//!
//! ```rust
//! use jroh_core::schema::{TypeSpec, classify, WireType};
//!
//! let spec = TypeSpec::list(TypeSpec::Int);
//! assert_eq!(classify(&spec), WireType::Array);
//!
//! let opt = TypeSpec::option(TypeSpec::String);
//! assert_eq!(classify(&opt), WireType::String);
//! ```

pub mod constraint;
pub mod load;
pub mod wire;

pub use constraint::{Constraint, ConstraintError};
pub use load::{load, LoadError};
pub use wire::{classify, classify_or, WireType};

use serde_json::Value;
use std::fmt;

/// A declarative type descriptor
///
/// The closed-world counterpart of a language-level type annotation: every
/// parameter and return type a method can declare is one of these shapes.
/// Descriptors are cheap to clone and immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// The universal type: any JSON value passes through untouched
    Any,
    /// An unannotated parameter or return
    ///
    /// Only legal on methods registered with `validate = false`, where it
    /// behaves exactly like [`TypeSpec::Any`].
    Unknown,
    /// The JSON null type
    Null,
    /// Marker for a method that never produces a value; classifies as Null
    NoReturn,
    /// Exactly the boolean type (never numeric-compatible)
    Bool,
    /// JSON integer; a float or numeric string does not satisfy it
    Int,
    /// JSON number; integers satisfy it, strings do not
    Float,
    /// JSON string
    String,
    /// Byte-sequence parameter, carried as a wire string
    Bytes,
    /// Arbitrary-precision decimal, accepted as a number or decimal string
    Decimal,
    /// A fixed set of allowed values; the raw value must equal one of them
    Literal(Vec<Value>),
    /// Two-arm union with null: `null` loads to null, anything else loads
    /// against the inner descriptor
    Option(Box<TypeSpec>),
    /// Union with two or more non-null arms
    ///
    /// Classifiable for description purposes but unsupported for loading.
    Union(Vec<TypeSpec>),
    /// Homogeneous sequence, order preserved
    List(Box<TypeSpec>),
    /// Fixed-arity heterogeneous sequence; arity mismatches are load errors
    Tuple(Vec<TypeSpec>),
    /// Unordered collection; duplicate elements collapse after loading
    Set(Box<TypeSpec>),
    /// String-keyed mapping; the value descriptor governs reconstruction
    Map(Box<TypeSpec>, Box<TypeSpec>),
    /// Named enumeration resolved by underlying value, not by name
    Enum(EnumSpec),
    /// Structural record loaded field-by-field from a JSON object
    Record(RecordSpec),
    /// A descriptor wrapped with constraint metadata
    ///
    /// Metadata participates in the secondary validation pass and in the
    /// service description, never in structural loading.
    Annotated(Box<TypeSpec>, Vec<Constraint>),
    /// A type variable resolved via its bound or constraint set
    TypeVar(TypeVarSpec),
}

impl TypeSpec {
    /// Shorthand for `Option(Box::new(inner))`
    pub fn option(inner: TypeSpec) -> Self {
        TypeSpec::Option(Box::new(inner))
    }

    /// Shorthand for `List(Box::new(element))`
    pub fn list(element: TypeSpec) -> Self {
        TypeSpec::List(Box::new(element))
    }

    /// Shorthand for `Set(Box::new(element))`
    pub fn set(element: TypeSpec) -> Self {
        TypeSpec::Set(Box::new(element))
    }

    /// Shorthand for `Map(Box::new(key), Box::new(value))`
    pub fn map(key: TypeSpec, value: TypeSpec) -> Self {
        TypeSpec::Map(Box::new(key), Box::new(value))
    }

    /// Wrap a descriptor with constraint metadata
    pub fn annotated(inner: TypeSpec, constraints: Vec<Constraint>) -> Self {
        TypeSpec::Annotated(Box::new(inner), constraints)
    }

    /// The descriptor with any `Annotated` wrappers stripped
    pub fn strip(&self) -> &TypeSpec {
        match self {
            TypeSpec::Annotated(inner, _) => inner.strip(),
            other => other,
        }
    }

    /// The constraint metadata attached to this descriptor, outermost first
    pub fn constraints(&self) -> Vec<&Constraint> {
        let mut out = Vec::new();
        let mut cur = self;
        while let TypeSpec::Annotated(inner, cs) = cur {
            out.extend(cs.iter());
            cur = inner;
        }
        out
    }

    /// Whether a missing or null value satisfies this descriptor
    pub fn is_nullable(&self) -> bool {
        matches!(
            self.strip(),
            TypeSpec::Option(_) | TypeSpec::Null | TypeSpec::Any | TypeSpec::Unknown
        )
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Any => write!(f, "any"),
            TypeSpec::Unknown => write!(f, "unknown"),
            TypeSpec::Null => write!(f, "null"),
            TypeSpec::NoReturn => write!(f, "no-return"),
            TypeSpec::Bool => write!(f, "bool"),
            TypeSpec::Int => write!(f, "int"),
            TypeSpec::Float => write!(f, "float"),
            TypeSpec::String => write!(f, "str"),
            TypeSpec::Bytes => write!(f, "bytes"),
            TypeSpec::Decimal => write!(f, "decimal"),
            TypeSpec::Literal(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "literal[{}]", parts.join(", "))
            }
            TypeSpec::Option(inner) => write!(f, "{}?", inner),
            TypeSpec::Union(arms) => {
                let parts: Vec<String> = arms.iter().map(|a| a.to_string()).collect();
                write!(f, "union[{}]", parts.join(" | "))
            }
            TypeSpec::List(el) => write!(f, "list[{}]", el),
            TypeSpec::Tuple(els) => {
                let parts: Vec<String> = els.iter().map(|e| e.to_string()).collect();
                write!(f, "tuple[{}]", parts.join(", "))
            }
            TypeSpec::Set(el) => write!(f, "set[{}]", el),
            TypeSpec::Map(k, v) => write!(f, "map[{}, {}]", k, v),
            TypeSpec::Enum(e) => write!(f, "enum {}", e.name),
            TypeSpec::Record(r) => write!(f, "record {}", r.name),
            TypeSpec::Annotated(inner, _) => write!(f, "{}", inner),
            TypeSpec::TypeVar(tv) => write!(f, "typevar {}", tv.name),
        }
    }
}

/// A named enumeration with its allowed underlying values
///
/// Values resolve by underlying value, not by variant name - the wire
/// carries `2`, not `"Green"`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpec {
    pub name: String,
    pub values: Vec<Value>,
}

impl EnumSpec {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A structural record: a named, ordered set of typed fields
///
/// Loaded from a JSON object by recursing into each declared field; unknown
/// keys and missing non-nullable fields are rejected the way a keyword
/// constructor would reject them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl RecordSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a typed field (declaration order is preserved)
    pub fn field(mut self, name: impl Into<String>, spec: TypeSpec) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            spec,
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One declared field of a [`RecordSpec`]
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub spec: TypeSpec,
}

/// A type variable
///
/// Resolves through its bound when present, else through its constraint
/// set; with neither it behaves as the universal object type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeVarSpec {
    pub name: String,
    pub bound: Option<Box<TypeSpec>>,
    pub constraints: Vec<TypeSpec>,
}

impl TypeVarSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
            constraints: Vec::new(),
        }
    }

    pub fn bound(mut self, bound: TypeSpec) -> Self {
        self.bound = Some(Box::new(bound));
        self
    }

    pub fn constraint(mut self, constraint: TypeSpec) -> Self {
        self.constraints.push(constraint);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_annotated() {
        let spec = TypeSpec::annotated(
            TypeSpec::annotated(TypeSpec::Int, vec![Constraint::Minimum(0.0)]),
            vec![Constraint::Maximum(10.0)],
        );
        assert_eq!(spec.strip(), &TypeSpec::Int);
        assert_eq!(spec.constraints().len(), 2);
    }

    #[test]
    fn test_nullability() {
        assert!(TypeSpec::option(TypeSpec::Int).is_nullable());
        assert!(TypeSpec::Null.is_nullable());
        assert!(TypeSpec::Any.is_nullable());
        assert!(!TypeSpec::Int.is_nullable());
        // Annotation wrappers don't change nullability
        assert!(TypeSpec::annotated(
            TypeSpec::option(TypeSpec::Int),
            vec![Constraint::Nullable(false)]
        )
        .is_nullable());
    }

    #[test]
    fn test_record_builder_preserves_order() {
        let rec = RecordSpec::new("Point")
            .field("x", TypeSpec::Int)
            .field("y", TypeSpec::Int);
        assert_eq!(rec.fields[0].name, "x");
        assert_eq!(rec.fields[1].name, "y");
        assert!(rec.get("y").is_some());
        assert!(rec.get("z").is_none());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TypeSpec::list(TypeSpec::Int).to_string(), "list[int]");
        assert_eq!(TypeSpec::option(TypeSpec::String).to_string(), "str?");
        assert_eq!(
            TypeSpec::map(TypeSpec::String, TypeSpec::Float).to_string(),
            "map[str, float]"
        );
        assert_eq!(
            TypeSpec::Literal(vec![json!("a"), json!("b")]).to_string(),
            "literal[\"a\", \"b\"]"
        );
    }
}
