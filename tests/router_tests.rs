use brrtbind::binder::{Bound, Param};
use brrtbind::dispatcher::{Reply, ResponseBindings};
use brrtbind::router::{RouteDef, RouteError, RouteTable};
use brrtbind::schema::{Field, FieldType, SchemaDescriptor};
use http::Method;
use serde_json::Value;
use std::sync::Arc;

fn noop(_: &Bound) -> anyhow::Result<Reply> {
    Ok(Value::Null.into())
}

fn item_path() -> Arc<SchemaDescriptor> {
    SchemaDescriptor::builder("ItemPath")
        .field(Field::new("item_id", FieldType::Int))
        .build()
        .unwrap()
}

fn math_path() -> Arc<SchemaDescriptor> {
    SchemaDescriptor::builder("MathPath")
        .field(Field::new("a", FieldType::Int))
        .field(Field::new("b", FieldType::Int))
        .build()
        .unwrap()
}

fn table() -> RouteTable {
    let mut table = RouteTable::new();
    table
        .add(RouteDef::new(Method::GET, "/hello", noop).name("hello"))
        .unwrap();
    table
        .add(
            RouteDef::new(Method::GET, "/math/{a}and{b}", noop)
                .name("math")
                .param(Param::path("path", &math_path())),
        )
        .unwrap();
    table
        .add(
            RouteDef::new(Method::GET, "/filter/{item_id}", noop)
                .name("events")
                .param(Param::path("path", &item_path())),
        )
        .unwrap();
    table
        .add(
            RouteDef::new(Method::POST, "/filter/{item_id}", noop)
                .name("filters")
                .param(Param::path("path", &item_path())),
        )
        .unwrap();
    table
}

#[test]
fn test_route_matching() {
    let table = table();
    let cases = [
        (Method::GET, "/hello", Some("hello")),
        (Method::GET, "/math/3and4", Some("math")),
        (Method::GET, "/math/xandy", Some("math")),
        (Method::GET, "/filter/1", Some("events")),
        (Method::POST, "/filter/1", Some("filters")),
        (Method::GET, "/hello/", None),
        (Method::GET, "/math/3and", None),
        (Method::GET, "/filter/1/2", None),
        (Method::GET, "/nope", None),
    ];
    for (method, path, expected) in cases {
        let got = table.route(&method, path);
        assert_eq!(
            got.as_ref().map(|m| m.route.handler_name.as_ref()),
            expected,
            "{method} {path}"
        );
    }
}

#[test]
fn test_embedded_captures_extracted() {
    let m = table().route(&Method::GET, "/math/12and34").unwrap();
    assert_eq!(m.get_path_param("a"), Some("12"));
    assert_eq!(m.get_path_param("b"), Some("34"));
}

#[test]
fn test_duplicate_route_rejected() {
    let mut table = table();
    let err = table
        .register(
            Method::GET,
            "/hello",
            noop,
            Vec::new(),
            ResponseBindings::new(),
        )
        .unwrap_err();
    assert!(matches!(err, RouteError::DuplicateRoute { .. }));

    // capture names do not make a pattern distinct
    let renamed = SchemaDescriptor::builder("Renamed")
        .field(Field::new("id", FieldType::Int))
        .build()
        .unwrap();
    let err = table
        .add(RouteDef::new(Method::GET, "/filter/{id}", noop).param(Param::path("path", &renamed)))
        .unwrap_err();
    assert!(matches!(err, RouteError::DuplicateRoute { .. }));

    // same pattern, other method is fine
    table
        .register(Method::DELETE, "/hello", noop, Vec::new(), ResponseBindings::new())
        .unwrap();
}

#[test]
fn test_path_schema_must_match_captures() {
    let mut table = RouteTable::new();
    let err = table
        .add(RouteDef::new(Method::GET, "/items/{item_id}", noop))
        .unwrap_err();
    assert!(matches!(err, RouteError::UnboundPathParam { .. }));

    let err = table
        .add(RouteDef::new(Method::GET, "/items", noop).param(Param::path("path", &item_path())))
        .unwrap_err();
    assert!(matches!(err, RouteError::UnknownPathField { .. }));
    assert!(table.is_empty());
}

#[test]
fn test_allowed_methods() {
    let table = table();
    assert_eq!(
        table.allowed_methods("/filter/9"),
        vec![Method::GET, Method::POST]
    );
    assert!(table.allowed_methods("/nope").is_empty());
    assert!(table.route(&Method::PUT, "/filter/9").is_none());
}

#[test]
fn test_routes_listing() {
    let table = table();
    let listed: Vec<String> = table
        .routes()
        .map(|r| format!("{} {}", r.method, r.pattern))
        .collect();
    assert_eq!(
        listed,
        vec![
            "GET /hello",
            "GET /math/{a}and{b}",
            "GET /filter/{item_id}",
            "POST /filter/{item_id}"
        ]
    );
    assert_eq!(table.len(), 4);
}

#[test]
fn test_file_source_schema_rejected() {
    let mut table = RouteTable::new();
    let err = table
        .add(
            RouteDef::new(Method::POST, "/upload", noop)
                .param(Param::new("meta", brrtbind::binder::Source::File, &item_path())),
        )
        .unwrap_err();
    assert_eq!(
        err,
        RouteError::FileSchemaParam {
            pattern: "/upload".to_string(),
            param: "meta".to_string()
        }
    );
    assert!(table.is_empty());
}

#[test]
fn test_captures_are_percent_decoded() {
    let table = table();
    let m = table.route(&Method::GET, "/math/%33and4").unwrap();
    assert_eq!(m.get_path_param("a"), Some("3"));

    let m = table.route(&Method::GET, "/filter/a%2Fb").unwrap();
    assert_eq!(m.get_path_param("item_id"), Some("a/b"));

    // invalid UTF-8 after decoding is passed through untouched
    let m = table.route(&Method::GET, "/filter/%FF").unwrap();
    assert_eq!(m.get_path_param("item_id"), Some("%FF"));
}
