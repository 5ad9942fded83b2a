//! Constraint facets for annotated type descriptors
//!
//! A [`Constraint`] is metadata attached to a descriptor through
//! [`TypeSpec::Annotated`](super::TypeSpec::Annotated). Constraints never
//! participate in structural loading; they run as a secondary validation
//! pass over the already-coerced value, and documentation-only facets
//! (summary, description, example, deprecated) always pass.
//!
//! The numeric and string facets mirror the usual schema vocabulary:
//! minimum/maximum, multiple-of, min/max length, pattern, finiteness, and
//! decimal digit/place limits. `Required` and `Nullable` refine what the
//! type system alone admits - a nullable `Option` type can still be
//! rejected by `Nullable(false)`, because the constraint pass runs after
//! coercion.
//!
//! # Examples
//!
//! ```rust
//! use jroh_core::schema::Constraint;
//! use serde_json::json;
//!
//! let min = Constraint::Minimum(1.0);
//! assert!(min.check("a", &json!(2)).is_ok());
//! assert!(min.check("a", &json!(0)).is_err());
//! ```

use serde_json::Value;
use thiserror::Error;

/// Values treated as empty by the `Required` facet
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// A constraint-check failure
///
/// The message surfaces verbatim as the `data.message` of an
/// invalid-params error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConstraintError {
    pub message: String,
}

impl ConstraintError {
    fn new(message: String) -> Self {
        Self { message }
    }
}

/// One constraint facet
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Short one-line description (documentation only)
    Summary(String),
    /// Longer description (documentation only)
    Description(String),
    /// A named usage example (documentation only)
    Example { name: String, value: Value },
    /// Marks the parameter deprecated (documentation only)
    Deprecated(bool),
    /// Reject empty values (null, "", [], {}) when true
    Required(bool),
    /// Reject null when false
    Nullable(bool),
    /// Inclusive numeric lower bound
    Minimum(f64),
    /// Inclusive numeric upper bound
    Maximum(f64),
    /// The value must be an exact multiple
    MultipleOf(f64),
    /// Minimum length of a string or array
    MinLength(usize),
    /// Maximum length of a string or array
    MaxLength(usize),
    /// The string must match this regular expression
    Pattern(String),
    /// Reject NaN and infinities when false
    AllowInfNan(bool),
    /// Maximum count of significant whole digits of a decimal
    MaxDigits(u32),
    /// Maximum count of decimal places of a decimal
    DecimalPlaces(u32),
}

impl Constraint {
    /// Whether this facet only feeds documentation and never rejects
    pub fn is_documentation(&self) -> bool {
        matches!(
            self,
            Constraint::Summary(_)
                | Constraint::Description(_)
                | Constraint::Example { .. }
                | Constraint::Deprecated(_)
        )
    }

    /// Check an already-coerced value against this facet
    ///
    /// Facets only inspect values of the shape they speak about: a numeric
    /// bound ignores a non-number (the loader has already enforced the
    /// structural type).
    pub fn check(&self, name: &str, value: &Value) -> Result<(), ConstraintError> {
        match self {
            Constraint::Summary(_)
            | Constraint::Description(_)
            | Constraint::Example { .. }
            | Constraint::Deprecated(_) => Ok(()),

            Constraint::Required(required) => {
                if *required && is_empty_value(value) {
                    return Err(ConstraintError::new(format!(
                        "ensure the value of the parameter '{name}' is not empty"
                    )));
                }
                Ok(())
            }

            Constraint::Nullable(nullable) => {
                if !nullable && value.is_null() {
                    return Err(ConstraintError::new(format!(
                        "ensure the parameter '{name}' is not null"
                    )));
                }
                Ok(())
            }

            Constraint::Minimum(minimum) => {
                if let Some(n) = value.as_f64() {
                    if n < *minimum {
                        return Err(ConstraintError::new(format!(
                            "ensure the value of the parameter '{name}' is greater than or equal to {minimum}"
                        )));
                    }
                }
                Ok(())
            }

            Constraint::Maximum(maximum) => {
                if let Some(n) = value.as_f64() {
                    if n > *maximum {
                        return Err(ConstraintError::new(format!(
                            "ensure the value of the parameter '{name}' is less than or equal to {maximum}"
                        )));
                    }
                }
                Ok(())
            }

            Constraint::MultipleOf(multiple_of) => {
                if let Some(n) = value.as_f64() {
                    if *multiple_of != 0.0 && n % multiple_of != 0.0 {
                        return Err(ConstraintError::new(format!(
                            "ensure the value of the parameter '{name}' is a multiple of {multiple_of}"
                        )));
                    }
                }
                Ok(())
            }

            Constraint::MinLength(min_length) => {
                if let Some(len) = value_length(value) {
                    if len < *min_length {
                        return Err(ConstraintError::new(format!(
                            "ensure the value of the parameter '{name}' is greater than or equal to {min_length}"
                        )));
                    }
                }
                Ok(())
            }

            Constraint::MaxLength(max_length) => {
                if let Some(len) = value_length(value) {
                    if len > *max_length {
                        return Err(ConstraintError::new(format!(
                            "ensure the value of the parameter '{name}' is less than or equal to {max_length}"
                        )));
                    }
                }
                Ok(())
            }

            Constraint::Pattern(pattern) => {
                if let Value::String(s) = value {
                    let re = regex::Regex::new(pattern).map_err(|_| {
                        ConstraintError::new(format!(
                            "ensure the parameter '{name}' declares a valid pattern {pattern:?}"
                        ))
                    })?;
                    if !re.is_match(s) {
                        return Err(ConstraintError::new(format!(
                            "ensure the value of the parameter '{name}' matches the valid pattern {pattern:?}"
                        )));
                    }
                }
                Ok(())
            }

            Constraint::AllowInfNan(allow) => {
                if !allow {
                    // Infinities and NaN only reach here through decimal
                    // strings; JSON numbers are always finite
                    let non_finite = match value {
                        Value::String(s) => matches!(
                            s.trim().to_ascii_lowercase().as_str(),
                            "nan" | "inf" | "+inf" | "-inf" | "infinity" | "+infinity" | "-infinity"
                        ),
                        _ => false,
                    };
                    if non_finite {
                        return Err(ConstraintError::new(format!(
                            "ensure the value of the parameter '{name}' is not infinity, negative infinity, or NaN"
                        )));
                    }
                }
                Ok(())
            }

            Constraint::MaxDigits(max_digits) => {
                let (digits, decimals) = digits_and_decimals(name, value)?;
                let whole_digits = digits - decimals;
                if whole_digits > *max_digits {
                    return Err(ConstraintError::new(format!(
                        "ensure the value of the parameter '{name}' has a maximum of {max_digits} digits"
                    )));
                }
                Ok(())
            }

            Constraint::DecimalPlaces(decimal_places) => {
                let (_, decimals) = digits_and_decimals(name, value)?;
                if decimals > *decimal_places {
                    return Err(ConstraintError::new(format!(
                        "ensure the value of the parameter '{name}' has a maximum of {decimal_places} decimal places"
                    )));
                }
                Ok(())
            }
        }
    }
}

fn value_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        Value::Object(o) => Some(o.len()),
        _ => None,
    }
}

/// Count significant digits and decimal places of a decimal value
///
/// Works on the textual form of the number; exponent forms and non-numeric
/// strings are rejected.
fn digits_and_decimals(name: &str, value: &Value) -> Result<(u32, u32), ConstraintError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Ok((0, 0)),
    };
    let unsigned = text.trim_start_matches(['+', '-']);
    if unsigned.is_empty()
        || unsigned.contains(['e', 'E'])
        || !unsigned.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return Err(ConstraintError::new(format!(
            "ensure the value of the parameter '{name}' is a number"
        )));
    }
    let (whole, frac) = match unsigned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (unsigned, ""),
    };
    let whole_digits = whole.trim_start_matches('0').len() as u32;
    let decimals = frac.len() as u32;
    Ok((whole_digits + decimals, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_documentation_facets_always_pass() {
        let facets = vec![
            Constraint::Summary("s".into()),
            Constraint::Description("d".into()),
            Constraint::Example {
                name: "e".into(),
                value: json!(1),
            },
            Constraint::Deprecated(true),
        ];
        for facet in facets {
            assert!(facet.is_documentation());
            assert!(facet.check("p", &json!(null)).is_ok());
        }
    }

    #[test]
    fn test_required_rejects_empty() {
        let required = Constraint::Required(true);
        assert!(required.check("p", &json!(null)).is_err());
        assert!(required.check("p", &json!("")).is_err());
        assert!(required.check("p", &json!([])).is_err());
        assert!(required.check("p", &json!({})).is_err());
        assert!(required.check("p", &json!(0)).is_ok());
        assert!(required.check("p", &json!("x")).is_ok());
        assert!(Constraint::Required(false).check("p", &json!(null)).is_ok());
    }

    #[test]
    fn test_nullable() {
        assert!(Constraint::Nullable(false).check("p", &json!(null)).is_err());
        assert!(Constraint::Nullable(true).check("p", &json!(null)).is_ok());
        assert!(Constraint::Nullable(false).check("p", &json!(1)).is_ok());
    }

    #[test]
    fn test_numeric_bounds() {
        assert!(Constraint::Minimum(2.0).check("p", &json!(1)).is_err());
        assert!(Constraint::Minimum(2.0).check("p", &json!(2)).is_ok());
        assert!(Constraint::Maximum(2.0).check("p", &json!(3)).is_err());
        assert!(Constraint::Maximum(2.0).check("p", &json!(2)).is_ok());
        // Non-numbers are the loader's concern
        assert!(Constraint::Minimum(2.0).check("p", &json!("x")).is_ok());
    }

    #[test]
    fn test_multiple_of() {
        assert!(Constraint::MultipleOf(3.0).check("p", &json!(9)).is_ok());
        assert!(Constraint::MultipleOf(3.0).check("p", &json!(10)).is_err());
    }

    #[test]
    fn test_lengths() {
        assert!(Constraint::MinLength(2).check("p", &json!("a")).is_err());
        assert!(Constraint::MinLength(2).check("p", &json!("ab")).is_ok());
        assert!(Constraint::MaxLength(2).check("p", &json!([1, 2, 3])).is_err());
        assert!(Constraint::MaxLength(3).check("p", &json!([1, 2, 3])).is_ok());
    }

    #[test]
    fn test_pattern() {
        let pattern = Constraint::Pattern("^[a-z]+$".into());
        assert!(pattern.check("p", &json!("abc")).is_ok());
        assert!(pattern.check("p", &json!("ABC")).is_err());
        assert!(pattern.check("p", &json!(42)).is_ok());
    }

    #[test]
    fn test_allow_inf_nan() {
        let strict = Constraint::AllowInfNan(false);
        assert!(strict.check("p", &json!("NaN")).is_err());
        assert!(strict.check("p", &json!("-Infinity")).is_err());
        assert!(strict.check("p", &json!("1.5")).is_ok());
        assert!(Constraint::AllowInfNan(true).check("p", &json!("NaN")).is_ok());
    }

    #[test]
    fn test_decimal_digit_facets() {
        assert!(Constraint::MaxDigits(3).check("p", &json!("123.45")).is_ok());
        assert!(Constraint::MaxDigits(2).check("p", &json!("123.45")).is_err());
        assert!(Constraint::DecimalPlaces(2).check("p", &json!("1.23")).is_ok());
        assert!(Constraint::DecimalPlaces(1).check("p", &json!("1.23")).is_err());
        assert!(Constraint::MaxDigits(3).check("p", &json!("1e3")).is_err());
    }
}
