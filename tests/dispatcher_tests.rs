use brrtbind::binder::{Bound, Param, RequestContext};
use brrtbind::dispatcher::{dispatch, dispatch_reply, Reply, ResponseBindings};
use brrtbind::router::{RouteDef, RouteTable};
use brrtbind::schema::{Field, FieldType, SchemaDescriptor};
use brrtbind::server::AppService;
use http::Method;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn error_schema() -> Arc<SchemaDescriptor> {
    SchemaDescriptor::builder("Error")
        .field(Field::new("message", FieldType::Str))
        .build()
        .unwrap()
}

fn item_schema() -> Arc<SchemaDescriptor> {
    SchemaDescriptor::builder("Item")
        .field(Field::new("id", FieldType::Int))
        .field(Field::new("label", FieldType::Str).default("unnamed"))
        .build()
        .unwrap()
}

fn bindings() -> ResponseBindings {
    let mut responses = ResponseBindings::new();
    responses.insert(200, item_schema());
    responses.insert(403, error_schema());
    responses
}

#[test]
fn test_status_selects_schema() {
    let env = dispatch(
        &bindings(),
        403,
        json!({"message": "forbidden", "id": 4}),
    )
    .unwrap();
    assert_eq!(env.status, 403);
    assert_eq!(env.body, json!({"message": "forbidden"}));

    let env = dispatch_reply(&bindings(), json!({"id": "4"}).into()).unwrap();
    assert_eq!(env.body, json!({"id": 4, "label": "unnamed"}));
}

#[test]
fn test_error_schema_rejects_wrong_shape() {
    let err = dispatch(&bindings(), 403, json!({"detail": "nope"})).unwrap_err();
    assert_eq!(err.status, 403);
    assert_eq!(err.schema, "Error");
    assert_eq!(err.errors[0].loc, vec!["response", "message"]);
}

#[test]
fn test_unbound_status_passes_through() {
    let env = dispatch_reply(&bindings(), Reply::Status(202, json!("queued"))).unwrap();
    assert_eq!(env.status, 202);
    assert_eq!(env.body, json!("queued"));
}

#[test]
fn test_instance_reply() {
    let schema = item_schema();
    let mut values = serde_json::Map::new();
    values.insert("id".into(), json!(9));
    let inst = schema.instantiate(&values).unwrap();
    let env = dispatch_reply(&ResponseBindings::new(), inst.into()).unwrap();
    assert_eq!(env.body, json!({"id": 9, "label": "unnamed"}));
}

#[test]
fn test_service_maps_dispatch_outcomes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let query = SchemaDescriptor::builder("Mode")
        .field(Field::new("mode", FieldType::Str))
        .build()
        .unwrap();

    let handler = move |bound: &Bound| -> anyhow::Result<Reply> {
        counter.fetch_add(1, Ordering::SeqCst);
        let mode = bound.require("q")?.require_str("mode")?.to_string();
        match mode.as_str() {
            "ok" => Ok(json!({"id": 1}).into()),
            "deny" => Ok((403, json!({"message": "no"})).into()),
            "bad" => Ok(json!({"label": "missing id"}).into()),
            _ => anyhow::bail!("unknown mode {mode}"),
        }
    };

    let mut table = RouteTable::new();
    table
        .add(
            RouteDef::new(Method::GET, "/items", handler)
                .name("items")
                .param(Param::query("q", &query))
                .responses(bindings()),
        )
        .unwrap();
    let service = AppService::new(Arc::new(table));
    let get = |target: &str| service.handle(RequestContext::new(Method::GET, target));

    let ok = get("/items?mode=ok");
    assert_eq!((ok.status, ok.body), (200, json!({"id": 1, "label": "unnamed"})));

    let deny = get("/items?mode=deny");
    assert_eq!((deny.status, deny.body), (403, json!({"message": "no"})));

    let bad = get("/items?mode=bad");
    assert_eq!(bad.status, 500);
    assert_eq!(bad.body["error"], "Response validation failed");

    let failed = get("/items?mode=boom");
    assert_eq!(failed.status, 500);
    assert_eq!(failed.body, json!({"error": "Handler failed", "handler": "items"}));

    assert_eq!(calls.load(Ordering::SeqCst), 4);

    // binding failure never reaches the handler
    let missing = get("/items");
    assert_eq!(missing.status, 422);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}
