//! Service description and OpenRPC export integration tests

use jroh_core::schema::{Constraint, RecordSpec, TypeSpec};
use jroh_server::{from_typed_fn, openrpc, Method, ServiceConfig, Site, DESCRIBE_METHOD_NAME};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct SumParams {
    a: f64,
    b: f64,
}

fn build_site() -> Site {
    let mut site = Site::new(
        ServiceConfig::new("/api")
            .with_name("petstore")
            .with_base_url("https://rpc.example.com"),
    );
    site.register(
        Method::new("App.sum", from_typed_fn(|p: SumParams| async move { Ok(p.a + p.b) }))
            .param("a", TypeSpec::Float)
            .param("b", TypeSpec::Float)
            .returns(TypeSpec::Float)
            .summary("Add two numbers"),
    )
    .unwrap();
    site
}

#[test]
fn test_describe_is_always_present() {
    let site = Site::new(ServiceConfig::default());
    assert!(site.has_method(DESCRIBE_METHOD_NAME));

    let describe = site.service_describe();
    assert!(describe.methods.contains_key(DESCRIBE_METHOD_NAME));
    assert!(!describe.methods[DESCRIBE_METHOD_NAME].options.notification);
}

#[test]
fn test_describe_reports_params_in_wire_vocabulary() {
    let site = build_site();
    let describe = serde_json::to_value(site.service_describe()).unwrap();

    assert_eq!(
        describe["methods"]["App.sum"]["params"],
        json!([
            {"name": "a", "type": "Number"},
            {"name": "b", "type": "Number"}
        ])
    );
    assert_eq!(describe["methods"]["App.sum"]["returns"]["type"], json!("Number"));
    assert_eq!(describe["methods"]["App.sum"]["type"], json!("method"));
    assert_eq!(describe["methods"]["App.sum"]["summary"], json!("Add two numbers"));
}

#[test]
fn test_describe_identity_and_servers() {
    let site = build_site();
    let describe = site.service_describe();

    assert!(describe.id.starts_with("urn:uuid:"));
    assert_eq!(describe.name, "petstore");
    assert_eq!(describe.version, "2.0");
    assert_eq!(describe.servers[0].url, "https://rpc.example.com/api");
}

#[test]
fn test_describe_reflects_current_table() {
    let mut site = build_site();
    assert!(!site.service_describe().methods.contains_key("App.later"));

    site.register(
        Method::new("App.later", from_typed_fn(|_: ()| async move { Ok(true) }))
            .returns(TypeSpec::Bool),
    )
    .unwrap();
    assert!(site.service_describe().methods.contains_key("App.later"));

    // Re-registration replaces the described entry too
    site.register(
        Method::new("App.later", from_typed_fn(|_: ()| async move { Ok(true) }))
            .returns(TypeSpec::Bool)
            .summary("replaced"),
    )
    .unwrap();
    assert_eq!(
        site.service_describe().methods["App.later"].summary.as_deref(),
        Some("replaced")
    );
}

#[test]
fn test_describe_nested_record_properties() {
    let mut site = build_site();
    let pet = RecordSpec::new("Pet")
        .field("name", TypeSpec::String)
        .field("age", TypeSpec::Int);
    site.register(
        Method::new("pet.create", from_typed_fn(|_: ()| async move { Ok(true) }))
            .param("pet", TypeSpec::Record(pet))
            .returns(TypeSpec::Bool)
            .validate(false),
    )
    .unwrap();

    let describe = serde_json::to_value(site.service_describe()).unwrap();
    let pet_param = &describe["methods"]["pet.create"]["params"][0];
    assert_eq!(pet_param["type"], json!("Object"));
    assert_eq!(pet_param["properties"]["name"]["type"], json!("String"));
    assert_eq!(pet_param["properties"]["age"]["type"], json!("Number"));
}

#[test]
fn test_describe_constraint_facets() {
    let mut site = build_site();
    site.register(
        Method::new("clamped", from_typed_fn(|_: ()| async move { Ok(0i64) }))
            .param(
                "n",
                TypeSpec::annotated(
                    TypeSpec::Int,
                    vec![Constraint::Minimum(1.0), Constraint::Maximum(5.0)],
                ),
            )
            .returns(TypeSpec::Int)
            .validate(false),
    )
    .unwrap();

    let describe = serde_json::to_value(site.service_describe()).unwrap();
    let param = &describe["methods"]["clamped"]["params"][0];
    assert_eq!(param["minimum"], json!(1.0));
    assert_eq!(param["maximum"], json!(5.0));
}

#[tokio::test]
async fn test_describe_dispatches_as_method() {
    let site = build_site();
    let reply = site
        .dispatch_request(br#"{"jsonrpc":"2.0","method":"rpc.describe","id":1}"#)
        .await;

    assert_eq!(reply.status, 200);
    let body = reply.body.unwrap();
    let result = &body["result"];
    assert!(result["methods"]["App.sum"].is_object());
    assert!(result["id"].as_str().unwrap().starts_with("urn:uuid:"));
}

#[tokio::test]
async fn test_describe_rejects_notification_form() {
    let site = build_site();
    let reply = site
        .dispatch_request(br#"{"jsonrpc":"2.0","method":"rpc.describe"}"#)
        .await;

    assert_eq!(reply.status, 400);
    assert_eq!(reply.body.unwrap()["error"]["code"], json!(-32600));
}

#[test]
fn test_openrpc_export() {
    let site = build_site();
    let document = serde_json::to_value(openrpc::export(&site.service_describe())).unwrap();

    assert_eq!(document["openrpc"], json!("1.3.2"));
    assert_eq!(document["info"]["title"], json!("petstore"));
    assert_eq!(document["servers"][0]["url"], json!("https://rpc.example.com/api"));

    let methods = document["methods"].as_array().unwrap();
    let sum = methods
        .iter()
        .find(|m| m["name"] == json!("App.sum"))
        .unwrap();
    assert_eq!(
        sum["params"],
        json!([
            {"name": "a", "schema": {"type": "number"}},
            {"name": "b", "schema": {"type": "number"}}
        ])
    );
    assert_eq!(sum["result"]["schema"]["type"], json!("number"));
}
