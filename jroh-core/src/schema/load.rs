//! The type loader / coercion engine
//!
//! [`load`] reconstructs a normalized value from raw JSON-decoded data
//! according to a declared [`TypeSpec`], recursing into compound shapes.
//! The wire decoder already produced native JSON scalars, so scalar steps
//! are shape checks rather than conversions - a string handed to an `Int`
//! parameter is never silently parsed.
//!
//! Dispatch on the descriptor is most-specific-first:
//!
//! 1. `Any`/`Unknown` pass anything through
//! 2. exact scalars are shape-checked passthroughs
//! 3. optional types map null to null and recurse otherwise
//! 4. sequences, tuples, sets and maps recurse element-wise
//! 5. literals and enums require an exact allowed value
//! 6. records reconstruct field-by-field, rejecting unknown keys and
//!    missing non-nullable fields the way a keyword constructor would
//!
//! Unions with two or more non-null arms are not loadable; only the
//! `Optional`/two-arm form is supported. Annotated wrappers are stripped -
//! their constraint facets belong to a separate pass
//! (see [`constraint`](super::constraint)).
//!
//! # Examples
//!
//! ```rust
//! use jroh_core::schema::{load, TypeSpec};
//! use serde_json::json;
//!
//! let spec = TypeSpec::list(TypeSpec::Int);
//! assert_eq!(load(&spec, json!([1, 2, 3])).unwrap(), json!([1, 2, 3]));
//! assert!(load(&spec, json!([1, "2"])).is_err());
//!
//! let opt = TypeSpec::option(TypeSpec::String);
//! assert_eq!(load(&opt, json!(null)).unwrap(), json!(null));
//! ```

use super::{RecordSpec, TypeSpec};
use serde_json::Value;
use thiserror::Error;

/// A loading failure: the raw value's shape cannot satisfy the descriptor
///
/// The message names the expected descriptor and the offending value and
/// surfaces verbatim as the `data.message` of an invalid-params error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn mismatch(spec: &TypeSpec, value: &Value) -> Self {
        Self::new(format!("expected a value of type {spec}, got: {value}"))
    }
}

/// Load a raw JSON value against a type descriptor
///
/// Returns the normalized value, or a [`LoadError`] when the shape does
/// not satisfy the descriptor.
pub fn load(spec: &TypeSpec, value: Value) -> Result<Value, LoadError> {
    match spec {
        TypeSpec::Any | TypeSpec::Unknown => Ok(value),

        TypeSpec::Annotated(inner, _) => load(inner, value),

        TypeSpec::Bool => match value {
            Value::Bool(_) => Ok(value),
            other => Err(LoadError::mismatch(spec, &other)),
        },

        TypeSpec::Int => {
            let is_integer = matches!(&value, Value::Number(n) if n.is_i64() || n.is_u64());
            if is_integer {
                Ok(value)
            } else {
                Err(LoadError::mismatch(spec, &value))
            }
        }

        TypeSpec::Float => match value {
            Value::Number(_) => Ok(value),
            other => Err(LoadError::mismatch(spec, &other)),
        },

        TypeSpec::String | TypeSpec::Bytes => match value {
            Value::String(_) => Ok(value),
            other => Err(LoadError::mismatch(spec, &other)),
        },

        TypeSpec::Decimal => {
            let is_decimal = match &value {
                Value::Number(_) => true,
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(|parsed| parsed.is_finite())
                    .unwrap_or(false),
                _ => false,
            };
            if is_decimal {
                Ok(value)
            } else {
                Err(LoadError::mismatch(spec, &value))
            }
        }

        TypeSpec::Null | TypeSpec::NoReturn => match value {
            Value::Null => Ok(value),
            other => Err(LoadError::mismatch(spec, &other)),
        },

        TypeSpec::Option(inner) => match value {
            Value::Null => Ok(Value::Null),
            other => load(inner, other),
        },

        TypeSpec::Union(_) => Err(LoadError::new(
            "the only type of union that is supported is a two-arm union with null (an optional type)",
        )),

        TypeSpec::List(element) => match value {
            Value::Array(items) => {
                let mut loaded = Vec::with_capacity(items.len());
                for item in items {
                    loaded.push(load(element, item)?);
                }
                Ok(Value::Array(loaded))
            }
            other => Err(LoadError::mismatch(spec, &other)),
        },

        TypeSpec::Tuple(slots) => match value {
            Value::Array(items) => {
                if items.len() != slots.len() {
                    return Err(LoadError::new(format!(
                        "expected a tuple of {} elements, got {}",
                        slots.len(),
                        items.len()
                    )));
                }
                let mut loaded = Vec::with_capacity(items.len());
                for (slot, item) in slots.iter().zip(items) {
                    loaded.push(load(slot, item)?);
                }
                Ok(Value::Array(loaded))
            }
            other => Err(LoadError::mismatch(spec, &other)),
        },

        TypeSpec::Set(element) => match value {
            Value::Array(items) => {
                // Unordered container semantics: duplicates collapse,
                // first occurrence wins
                let mut loaded: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    let item = load(element, item)?;
                    if !loaded.contains(&item) {
                        loaded.push(item);
                    }
                }
                Ok(Value::Array(loaded))
            }
            other => Err(LoadError::mismatch(spec, &other)),
        },

        TypeSpec::Map(_key, val) => match value {
            Value::Object(entries) => {
                // Wire keys are always strings; the key descriptor only
                // matters for hosts that coerce keys, which JSON does not
                let mut loaded = serde_json::Map::with_capacity(entries.len());
                for (k, v) in entries {
                    loaded.insert(k, load(val, v)?);
                }
                Ok(Value::Object(loaded))
            }
            other => Err(LoadError::mismatch(spec, &other)),
        },

        TypeSpec::Literal(allowed) => {
            if allowed.contains(&value) {
                Ok(value)
            } else {
                let shown: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
                Err(LoadError::new(format!(
                    "expected one of [{}], got: {}",
                    shown.join(", "),
                    value
                )))
            }
        }

        TypeSpec::Enum(enum_spec) => {
            if enum_spec.values.contains(&value) {
                Ok(value)
            } else {
                Err(LoadError::new(format!(
                    "{} is not a valid value for enum {}",
                    value, enum_spec.name
                )))
            }
        }

        TypeSpec::Record(record) => load_record(record, value),

        TypeSpec::TypeVar(tv) => {
            if let Some(bound) = &tv.bound {
                return load(bound, value);
            }
            for constraint in &tv.constraints {
                if let Ok(loaded) = load(constraint, value.clone()) {
                    return Ok(loaded);
                }
            }
            if tv.constraints.is_empty() {
                Ok(value)
            } else {
                Err(LoadError::mismatch(spec, &value))
            }
        }
    }
}

/// Reconstruct a record from a JSON object, field by field
///
/// Phrased like a keyword constructor: unknown keys and missing
/// non-nullable fields are rejected with constructor-style messages.
fn load_record(record: &RecordSpec, value: Value) -> Result<Value, LoadError> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => {
            return Err(LoadError::new(format!(
                "expected a value of type record {}, got: {}",
                record.name, other
            )))
        }
    };

    for key in entries.keys() {
        if record.get(key).is_none() {
            return Err(LoadError::new(format!(
                "{}() got an unexpected keyword argument '{}'",
                record.name, key
            )));
        }
    }

    let mut loaded = serde_json::Map::with_capacity(record.fields.len());
    for field in &record.fields {
        match entries.get(&field.name) {
            Some(v) => {
                loaded.insert(field.name.clone(), load(&field.spec, v.clone())?);
            }
            None if field.spec.is_nullable() => {
                loaded.insert(field.name.clone(), Value::Null);
            }
            None => {
                return Err(LoadError::new(format!(
                    "{}() missing a required argument: '{}'",
                    record.name, field.name
                )));
            }
        }
    }
    Ok(Value::Object(loaded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Constraint, EnumSpec, TypeVarSpec};
    use serde_json::json;

    #[test]
    fn test_any_passthrough() {
        assert_eq!(load(&TypeSpec::Any, json!({"k": [1]})).unwrap(), json!({"k": [1]}));
        assert_eq!(load(&TypeSpec::Unknown, json!(null)).unwrap(), json!(null));
    }

    #[test]
    fn test_scalars_shape_checked() {
        assert_eq!(load(&TypeSpec::Int, json!(5)).unwrap(), json!(5));
        assert_eq!(load(&TypeSpec::Float, json!(5)).unwrap(), json!(5));
        assert_eq!(load(&TypeSpec::Float, json!(5.5)).unwrap(), json!(5.5));
        assert_eq!(load(&TypeSpec::String, json!("s")).unwrap(), json!("s"));
        assert_eq!(load(&TypeSpec::Bool, json!(true)).unwrap(), json!(true));

        // No silent parsing across shapes
        assert!(load(&TypeSpec::Int, json!("5")).is_err());
        assert!(load(&TypeSpec::Int, json!(5.5)).is_err());
        assert!(load(&TypeSpec::Int, json!(true)).is_err());
        assert!(load(&TypeSpec::Float, json!("5.5")).is_err());
        assert!(load(&TypeSpec::Bool, json!(1)).is_err());
        assert!(load(&TypeSpec::String, json!(5)).is_err());
    }

    #[test]
    fn test_bytes_wraps_text() {
        assert_eq!(load(&TypeSpec::Bytes, json!("data")).unwrap(), json!("data"));
        assert!(load(&TypeSpec::Bytes, json!([1, 2])).is_err());
    }

    #[test]
    fn test_null_requires_null() {
        assert_eq!(load(&TypeSpec::Null, json!(null)).unwrap(), json!(null));
        assert!(load(&TypeSpec::Null, json!(0)).is_err());
        assert_eq!(load(&TypeSpec::NoReturn, json!(null)).unwrap(), json!(null));
    }

    #[test]
    fn test_optional_two_arm() {
        let spec = TypeSpec::option(TypeSpec::Int);
        assert_eq!(load(&spec, json!(null)).unwrap(), json!(null));
        assert_eq!(load(&spec, json!(3)).unwrap(), json!(3));
        assert!(load(&spec, json!("3")).is_err());
    }

    #[test]
    fn test_wide_union_rejected() {
        let spec = TypeSpec::Union(vec![TypeSpec::Int, TypeSpec::String]);
        let err = load(&spec, json!(1)).unwrap_err();
        assert!(err.message.contains("two-arm union"));
    }

    #[test]
    fn test_list_preserves_order() {
        let spec = TypeSpec::list(TypeSpec::Int);
        assert_eq!(load(&spec, json!([3, 1, 2])).unwrap(), json!([3, 1, 2]));
        assert!(load(&spec, json!([1, "x"])).is_err());
        assert!(load(&spec, json!({"0": 1})).is_err());
    }

    #[test]
    fn test_tuple_arity() {
        let spec = TypeSpec::Tuple(vec![TypeSpec::Int, TypeSpec::String]);
        assert_eq!(load(&spec, json!([1, "a"])).unwrap(), json!([1, "a"]));
        let err = load(&spec, json!([1])).unwrap_err();
        assert!(err.message.contains("2 elements"));
        assert!(load(&spec, json!(["a", 1])).is_err());
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let spec = TypeSpec::set(TypeSpec::Int);
        assert_eq!(load(&spec, json!([1, 2, 1, 3])).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_map_values_recurse() {
        let spec = TypeSpec::map(TypeSpec::String, TypeSpec::Int);
        assert_eq!(
            load(&spec, json!({"a": 1, "b": 2})).unwrap(),
            json!({"a": 1, "b": 2})
        );
        assert!(load(&spec, json!({"a": "1"})).is_err());
        assert!(load(&spec, json!([["a", 1]])).is_err());
    }

    #[test]
    fn test_literal_requires_exact_value() {
        let spec = TypeSpec::Literal(vec![json!("red"), json!("green")]);
        assert_eq!(load(&spec, json!("red")).unwrap(), json!("red"));
        let err = load(&spec, json!("blue")).unwrap_err();
        assert!(err.message.contains("\"red\""));
    }

    #[test]
    fn test_enum_by_underlying_value() {
        let spec = TypeSpec::Enum(EnumSpec::new("Color", vec![json!(1), json!(2), json!(3)]));
        assert_eq!(load(&spec, json!(2)).unwrap(), json!(2));
        let err = load(&spec, json!("Green")).unwrap_err();
        assert!(err.message.contains("Color"));
    }

    #[test]
    fn test_decimal_from_string_or_number() {
        assert_eq!(load(&TypeSpec::Decimal, json!("1.25")).unwrap(), json!("1.25"));
        assert_eq!(load(&TypeSpec::Decimal, json!(1.25)).unwrap(), json!(1.25));
        assert!(load(&TypeSpec::Decimal, json!("not-a-number")).is_err());
        assert!(load(&TypeSpec::Decimal, json!([1])).is_err());
    }

    #[test]
    fn test_annotated_strips_metadata() {
        let spec = TypeSpec::annotated(TypeSpec::Int, vec![Constraint::Minimum(10.0)]);
        // Structural loading ignores the facet; the constraint pass is separate
        assert_eq!(load(&spec, json!(1)).unwrap(), json!(1));
    }

    #[test]
    fn test_record_by_field() {
        let spec = TypeSpec::Record(
            RecordSpec::new("Pet")
                .field("name", TypeSpec::String)
                .field("tag", TypeSpec::option(TypeSpec::String)),
        );
        assert_eq!(
            load(&spec, json!({"name": "rex", "tag": "dog"})).unwrap(),
            json!({"name": "rex", "tag": "dog"})
        );
        // Nullable field may be absent
        assert_eq!(
            load(&spec, json!({"name": "rex"})).unwrap(),
            json!({"name": "rex", "tag": null})
        );
    }

    #[test]
    fn test_record_unknown_key() {
        let spec = TypeSpec::Record(RecordSpec::new("Pet").field("name", TypeSpec::String));
        let err = load(&spec, json!({"name": "rex", "color": "brown"})).unwrap_err();
        assert_eq!(
            err.message,
            "Pet() got an unexpected keyword argument 'color'"
        );
    }

    #[test]
    fn test_record_missing_field() {
        let spec = TypeSpec::Record(RecordSpec::new("Pet").field("name", TypeSpec::String));
        let err = load(&spec, json!({})).unwrap_err();
        assert_eq!(err.message, "Pet() missing a required argument: 'name'");
    }

    #[test]
    fn test_nested_record() {
        let inner = RecordSpec::new("Point")
            .field("x", TypeSpec::Int)
            .field("y", TypeSpec::Int);
        let spec = TypeSpec::Record(
            RecordSpec::new("Line")
                .field("start", TypeSpec::Record(inner.clone()))
                .field("end", TypeSpec::Record(inner)),
        );
        let ok = json!({"start": {"x": 0, "y": 0}, "end": {"x": 1, "y": 1}});
        assert_eq!(load(&spec, ok.clone()).unwrap(), ok);
        assert!(load(&spec, json!({"start": {"x": 0, "y": "0"}, "end": {"x": 1, "y": 1}})).is_err());
    }

    #[test]
    fn test_type_var_loading() {
        let bounded = TypeSpec::TypeVar(TypeVarSpec::new("T").bound(TypeSpec::Int));
        assert_eq!(load(&bounded, json!(1)).unwrap(), json!(1));
        assert!(load(&bounded, json!("1")).is_err());

        let constrained = TypeSpec::TypeVar(
            TypeVarSpec::new("N")
                .constraint(TypeSpec::Int)
                .constraint(TypeSpec::String),
        );
        assert_eq!(load(&constrained, json!("x")).unwrap(), json!("x"));
        assert!(load(&constrained, json!(true)).is_err());

        let bare = TypeSpec::TypeVar(TypeVarSpec::new("U"));
        assert_eq!(load(&bare, json!({"any": 1})).unwrap(), json!({"any": 1}));
    }

    #[test]
    fn test_load_roundtrips_wellformed_values() {
        // load ∘ serialize is the identity for well-formed scalar, array
        // and object values
        let cases = vec![
            (TypeSpec::Int, json!(7)),
            (TypeSpec::String, json!("s")),
            (TypeSpec::Bool, json!(false)),
            (TypeSpec::list(TypeSpec::Float), json!([1.5, 2.0])),
            (
                TypeSpec::map(TypeSpec::String, TypeSpec::String),
                json!({"a": "b"}),
            ),
        ];
        for (spec, value) in cases {
            assert_eq!(load(&spec, value.clone()).unwrap(), value);
        }
    }

    #[test]
    fn test_error_names_expected_and_offending() {
        let err = load(&TypeSpec::Int, json!("oops")).unwrap_err();
        assert!(err.message.contains("int"));
        assert!(err.message.contains("oops"));
    }
}
