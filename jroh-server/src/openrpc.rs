//! OpenRPC export
//!
//! Lifts the service description produced by `rpc.describe` into an
//! OpenRPC document: params and result become `{name, schema}` content
//! descriptors, wire-type names lowercase into OpenRPC primitive names,
//! and record `properties` nest as object schemas. The export consumes
//! [`ServiceDescribe`] unchanged - anything the descriptor reports can be
//! exported.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::{from_typed_fn, openrpc, Method, ServiceConfig, Site};
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
//! let document = openrpc::export(&site.service_describe());
//! assert_eq!(document.openrpc, "1.3.2");
//! ```

use crate::describe::{FieldDescribe, ServiceDescribe};
use serde::Serialize;
use std::collections::BTreeMap;

pub const OPENRPC_VERSION: &str = "1.3.2";

/// An OpenRPC document
#[derive(Debug, Clone, Serialize)]
pub struct OpenRpcDocument {
    pub openrpc: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub methods: Vec<OpenRpcMethod>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenRpcMethod {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    pub params: Vec<ContentDescriptor>,
    pub result: ContentDescriptor,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorObject>,
}

/// OpenRPC's `{name, schema}` wrapper around a typed value
#[derive(Debug, Clone, Serialize)]
pub struct ContentDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub schema: Schema,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
}

/// A (deliberately small) JSON-schema fragment
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
}

fn schema_of(field: &FieldDescribe) -> Schema {
    Schema {
        schema_type: field.type_name.to_ascii_lowercase(),
        properties: field
            .properties
            .as_ref()
            .map(|props| props.iter().map(|(k, v)| (k.clone(), schema_of(v))).collect()),
    }
}

fn content_descriptor(field: &FieldDescribe, fallback_name: &str) -> ContentDescriptor {
    ContentDescriptor {
        name: field.name.clone().unwrap_or_else(|| fallback_name.to_string()),
        summary: field.summary.clone(),
        required: field.required,
        schema: schema_of(field),
    }
}

/// Lift a service description into an OpenRPC document
pub fn export(describe: &ServiceDescribe) -> OpenRpcDocument {
    let methods = describe
        .methods
        .iter()
        .map(|(name, method)| OpenRpcMethod {
            name: name.clone(),
            summary: method.summary.clone(),
            description: method.description.clone(),
            deprecated: method.deprecated,
            params: method
                .params
                .iter()
                .map(|p| content_descriptor(p, "param"))
                .collect(),
            result: content_descriptor(&method.returns, "result"),
            errors: method
                .errors
                .iter()
                .map(|e| ErrorObject {
                    code: e.code,
                    message: e.message.clone(),
                })
                .collect(),
        })
        .collect();

    OpenRpcDocument {
        openrpc: OPENRPC_VERSION.to_string(),
        info: Info {
            title: describe.name.clone(),
            version: describe.version.clone(),
        },
        servers: describe
            .servers
            .iter()
            .map(|s| Server { url: s.url.clone() })
            .collect(),
        methods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::describe_field;
    use jroh_core::schema::{RecordSpec, TypeSpec};

    #[test]
    fn test_schema_lowercases_wire_names() {
        let field = describe_field(Some("a"), &TypeSpec::Float);
        let schema = schema_of(&field);
        assert_eq!(schema.schema_type, "number");
    }

    #[test]
    fn test_record_schema_nests_properties() {
        let spec = TypeSpec::Record(
            RecordSpec::new("Pet")
                .field("name", TypeSpec::String)
                .field("age", TypeSpec::Int),
        );
        let schema = schema_of(&describe_field(None, &spec));
        assert_eq!(schema.schema_type, "object");
        let props = schema.properties.unwrap();
        assert_eq!(props["name"].schema_type, "string");
        assert_eq!(props["age"].schema_type, "number");
    }

    #[test]
    fn test_content_descriptor_wraps_name_and_schema() {
        let field = describe_field(Some("a"), &TypeSpec::String);
        let cd = content_descriptor(&field, "param");
        assert_eq!(cd.name, "a");
        assert_eq!(cd.schema.schema_type, "string");

        let unnamed = describe_field(None, &TypeSpec::Bool);
        assert_eq!(content_descriptor(&unnamed, "result").name, "result");
    }
}
