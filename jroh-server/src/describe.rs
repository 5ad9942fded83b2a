//! The service descriptor
//!
//! Walks every registered method and produces a structured, serializable
//! self-description: service identity, servers, and a per-method map of
//! parameter/return fields in wire-type vocabulary. The description is
//! built lazily on every call so it always reflects the current method
//! table, and it is what the built-in `rpc.describe` method returns.
//!
//! Nested structural types surface as a `properties` map mirroring the
//! record's declared fields, recursively. Constraint facets attached to a
//! descriptor (minimum, pattern, required, ...) become the corresponding
//! facet members of the field description.

use crate::method::{ErrorDoc, ExampleDoc, MethodDescriptor};
use crate::registry::{Site, DESCRIBE_METHOD_NAME};
use jroh_core::schema::{classify, Constraint, TypeSpec};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// The whole-service description returned by `rpc.describe`
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDescribe {
    pub id: String,
    pub version: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub servers: Vec<ServerDescribe>,
    pub methods: BTreeMap<String, MethodDescribe>,
}

/// One advertised server endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ServerDescribe {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The per-method options surfaced in the description
#[derive(Debug, Clone, Serialize)]
pub struct OptionsDescribe {
    pub validate: bool,
    pub notification: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_auth: bool,
}

/// One method's description
#[derive(Debug, Clone, Serialize)]
pub struct MethodDescribe {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub options: OptionsDescribe,
    pub params: Vec<FieldDescribe>,
    pub returns: FieldDescribe,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDescribe>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<ExampleDescribe>,
}

/// A declared error, as documentation
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDescribe {
    pub code: i32,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A usage example
#[derive(Debug, Clone, Serialize)]
pub struct ExampleDescribe {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub params: Vec<ExampleValueDescribe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<Value>,
}

/// One named example value
#[derive(Debug, Clone, Serialize)]
pub struct ExampleValueDescribe {
    pub name: String,
    pub value: Value,
}

/// One parameter or return field, in wire-type vocabulary
///
/// Only members that are actually set serialize - a plain typed parameter
/// is exactly `{"name": ..., "type": ...}` on the wire.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FieldDescribe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, FieldDescribe>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<ExampleValueDescribe>,
}

/// Describe one field from its type descriptor
///
/// Classification supplies the wire-type name; constraint facets fill the
/// optional members; records recurse into a synthetic `properties` map
/// mirroring their declared fields.
pub fn describe_field(name: Option<&str>, spec: &TypeSpec) -> FieldDescribe {
    let mut field = FieldDescribe {
        name: name.map(str::to_string),
        type_name: classify(spec).name().to_string(),
        ..Default::default()
    };

    if spec.is_nullable() && !matches!(spec.strip(), TypeSpec::Any | TypeSpec::Unknown) {
        field.nullable = Some(true);
    }

    for constraint in spec.constraints() {
        match constraint {
            Constraint::Summary(s) => field.summary = Some(s.clone()),
            Constraint::Description(d) => field.description = Some(d.clone()),
            Constraint::Required(r) => field.required = Some(*r),
            Constraint::Nullable(n) => field.nullable = Some(*n),
            Constraint::Deprecated(d) => field.deprecated = Some(*d),
            Constraint::Minimum(m) => field.minimum = Some(*m),
            Constraint::Maximum(m) => field.maximum = Some(*m),
            Constraint::MultipleOf(m) => field.multiple_of = Some(*m),
            Constraint::MinLength(l) => field.min_length = Some(*l),
            Constraint::MaxLength(l) => field.max_length = Some(*l),
            Constraint::Pattern(p) => field.pattern = Some(p.clone()),
            Constraint::Example { name, value } => field.examples.push(ExampleValueDescribe {
                name: name.clone(),
                value: value.clone(),
            }),
            Constraint::AllowInfNan(_) | Constraint::MaxDigits(_) | Constraint::DecimalPlaces(_) => {}
        }
    }

    if let Some(record) = structural_record(spec) {
        let mut properties = BTreeMap::new();
        for record_field in &record.fields {
            properties.insert(
                record_field.name.clone(),
                describe_field(None, &record_field.spec),
            );
        }
        field.properties = Some(properties);
    }

    field
}

/// Peel annotation and optional wrappers down to a record, if one is there
fn structural_record(spec: &TypeSpec) -> Option<&jroh_core::schema::RecordSpec> {
    match spec {
        TypeSpec::Record(record) => Some(record),
        TypeSpec::Annotated(inner, _) | TypeSpec::Option(inner) => structural_record(inner),
        _ => None,
    }
}

fn describe_method(descriptor: &MethodDescriptor) -> MethodDescribe {
    let params = descriptor
        .signature
        .params
        .iter()
        .enumerate()
        .map(|(index, param)| describe_field(Some(&param.name), &descriptor.param_spec(index)))
        .collect();
    let returns_spec = descriptor.signature.returns.clone().unwrap_or(TypeSpec::Null);

    MethodDescribe {
        kind: "method".to_string(),
        summary: descriptor.summary.clone(),
        description: descriptor.description.clone(),
        options: OptionsDescribe {
            validate: descriptor.validate,
            notification: descriptor.notification,
            requires_auth: descriptor.requires_auth,
        },
        params,
        returns: describe_field(None, &returns_spec),
        deprecated: descriptor.deprecated,
        tags: descriptor.tags.clone(),
        errors: descriptor.errors.iter().map(describe_error).collect(),
        examples: descriptor.examples.iter().map(describe_example).collect(),
    }
}

fn describe_error(error: &ErrorDoc) -> ErrorDescribe {
    ErrorDescribe {
        code: error.code,
        message: error.message.clone(),
        status: error.http_status,
        data: error.data.clone(),
    }
}

fn describe_example(example: &ExampleDoc) -> ExampleDescribe {
    ExampleDescribe {
        name: example.name.clone(),
        summary: example.summary.clone(),
        params: example
            .params
            .iter()
            .map(|(name, value)| ExampleValueDescribe {
                name: name.clone(),
                value: value.clone(),
            })
            .collect(),
        returns: example.returns.clone(),
    }
}

impl Site {
    /// Build the whole-service description
    ///
    /// Never cached: re-registration must be reflected immediately, so the
    /// walk happens on every call.
    pub fn service_describe(&self) -> ServiceDescribe {
        let mut methods = BTreeMap::new();
        for name in self.method_names() {
            // A registration under the built-in name wins, matching the
            // dispatcher's resolution order
            let described = if let Some(method) = self.get(&name) {
                describe_method(&method.descriptor)
            } else if name == DESCRIBE_METHOD_NAME {
                describe_method(&Site::describe_descriptor())
            } else {
                continue;
            };
            methods.insert(name, described);
        }

        ServiceDescribe {
            id: self.urn(),
            version: self.config().version.clone(),
            name: self.config().name.clone(),
            description: None,
            servers: vec![ServerDescribe {
                url: self.config().server_url(),
                description: None,
            }],
            methods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jroh_core::schema::RecordSpec;
    use serde_json::json;

    #[test]
    fn test_plain_field_is_name_and_type_only() {
        let field = describe_field(Some("a"), &TypeSpec::Float);
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value, json!({"name": "a", "type": "Number"}));
    }

    #[test]
    fn test_optional_field_is_nullable() {
        let field = describe_field(Some("tag"), &TypeSpec::option(TypeSpec::String));
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value, json!({"name": "tag", "type": "String", "nullable": true}));
    }

    #[test]
    fn test_constraint_facets_surface() {
        let spec = TypeSpec::annotated(
            TypeSpec::Int,
            vec![
                Constraint::Summary("an int".into()),
                Constraint::Minimum(0.0),
                Constraint::Maximum(10.0),
                Constraint::Required(true),
            ],
        );
        let field = describe_field(Some("n"), &spec);
        assert_eq!(field.summary.as_deref(), Some("an int"));
        assert_eq!(field.minimum, Some(0.0));
        assert_eq!(field.maximum, Some(10.0));
        assert_eq!(field.required, Some(true));
        assert_eq!(field.type_name, "Number");
    }

    #[test]
    fn test_record_properties_recurse() {
        let spec = TypeSpec::Record(
            RecordSpec::new("Pet")
                .field("name", TypeSpec::String)
                .field("size", TypeSpec::Record(RecordSpec::new("Size").field("w", TypeSpec::Int))),
        );
        let field = describe_field(None, &spec);
        assert_eq!(field.type_name, "Object");
        let properties = field.properties.unwrap();
        assert_eq!(properties["name"].type_name, "String");
        let nested = properties["size"].properties.as_ref().unwrap();
        assert_eq!(nested["w"].type_name, "Number");
    }
}
