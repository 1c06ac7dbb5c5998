use brrtbind::binder::{
    bind, Binder, BindingError, MultipartConfig, Param, RequestContext, Source,
};
use brrtbind::schema::{Field, FieldType, SchemaDescriptor};
use http::Method;
use serde_json::{json, Value};
use std::sync::Arc;

mod common;
use common::multipart::Builder;

fn user_details() -> Arc<SchemaDescriptor> {
    SchemaDescriptor::builder("UserDetails")
        .field(Field::new("first_name", FieldType::Str))
        .field(Field::new("last_name", FieldType::Str))
        .field(Field::new("birthdate", FieldType::Date))
        .build()
        .unwrap()
}

fn headers_schema() -> Arc<SchemaDescriptor> {
    SchemaDescriptor::builder("Headers")
        .field(Field::new("x", FieldType::Str).default("x-header-value"))
        .field(Field::new("x_trace", FieldType::Bool).default(false).alias("X-Trace"))
        .build()
        .unwrap()
}

#[test]
fn test_header_binding_is_case_insensitive() {
    let ctx = RequestContext::new(Method::POST, "/test")
        .with_header("X", "abc")
        .with_header("x-trace", "yes");
    let inst = bind(&headers_schema(), &ctx, Source::Header).unwrap();
    assert_eq!(inst.get_str("x"), Some("abc"));
    assert_eq!(inst.get("x_trace"), Some(&json!(true)));
}

#[test]
fn test_header_default_when_absent() {
    let ctx = RequestContext::new(Method::POST, "/test");
    let inst = bind(&headers_schema(), &ctx, Source::Header).unwrap();
    assert_eq!(inst.get_str("x"), Some("x-header-value"));
}

#[test]
fn test_form_urlencoded() {
    let ctx = RequestContext::new(Method::POST, "/user-form").with_form(&[
        ("first_name", "Ann"),
        ("last_name", "Lee"),
        ("birthdate", "1990-04-01"),
    ]);
    let inst = bind(&user_details(), &ctx, Source::Form).unwrap();
    assert_eq!(
        inst.to_value(),
        json!({"first_name": "Ann", "last_name": "Lee", "birthdate": "1990-04-01"})
    );
}

#[test]
fn test_form_bad_date_reports_field() {
    let ctx = RequestContext::new(Method::POST, "/user-form").with_form(&[
        ("first_name", "Ann"),
        ("last_name", "Lee"),
        ("birthdate", "01/04/1990"),
    ]);
    let err = bind(&user_details(), &ctx, Source::Form).unwrap_err();
    let errors = err.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].loc, vec!["form", "birthdate"]);
    assert_eq!(err.status(), 422);
}

#[test]
fn test_missing_required_fields_collected() {
    let ctx = RequestContext::new(Method::POST, "/user-form").with_form(&[("first_name", "Ann")]);
    match bind(&user_details(), &ctx, Source::Form).unwrap_err() {
        BindingError::RequiredFieldMissing { source, errors } => {
            assert_eq!(source, Source::Form);
            let fields: Vec<&str> = errors.iter().map(|e| e.loc[1].as_str()).collect();
            assert_eq!(fields, vec!["last_name", "birthdate"]);
        }
        other => panic!("unexpected: {other}"),
    }
}

#[test]
fn test_multipart_body_part_and_file() {
    let body = Builder::new()
        .text(
            "details",
            r#"{"first_name":"Ann","last_name":"Lee","birthdate":"1990-04-01"}"#,
        )
        .file("file", "cv.txt", "text/plain", b"hello\r\nworld")
        .finish();
    let ctx = RequestContext::new(Method::POST, "/user-json")
        .with_header("Content-Type", &Builder::content_type())
        .with_body(body);

    let params = [Param::file("file"), Param::body("details", &user_details())];
    let bound = Binder::new(&ctx).bind_all(&params).unwrap();
    assert_eq!(bound.len(), 2);
    assert_eq!(
        bound.field("details", "first_name"),
        Some(&Value::String("Ann".into()))
    );
    let file = bound.require_file("file").unwrap();
    assert_eq!(file.name(), "cv.txt");
    assert_eq!(file.content_type(), Some("text/plain"));
    assert_eq!(file.bytes(), b"hello\r\nworld");

    let mut text = String::new();
    std::io::Read::read_to_string(&mut file.reader(), &mut text).unwrap();
    assert_eq!(text, "hello\r\nworld");
}

#[test]
fn test_multipart_missing_file() {
    let body = Builder::new()
        .text("first_name", "Ann")
        .text("last_name", "Lee")
        .text("birthdate", "1990-04-01")
        .finish();
    let ctx = RequestContext::new(Method::POST, "/user-form")
        .with_header("Content-Type", &Builder::content_type())
        .with_body(body);
    let params = [Param::form("details", &user_details()), Param::file("file")];
    match Binder::new(&ctx).bind_all(&params).unwrap_err() {
        BindingError::RequiredFieldMissing { source, errors } => {
            assert_eq!(source, Source::File);
            assert_eq!(errors[0].loc, vec!["file", "file"]);
        }
        other => panic!("unexpected: {other}"),
    }
}

#[test]
fn test_multipart_limits_surface_as_body_parse() {
    let body = Builder::new()
        .file("file", "big.bin", "application/octet-stream", &[7u8; 64])
        .finish();
    let ctx = RequestContext::new(Method::POST, "/upload")
        .with_header("Content-Type", &Builder::content_type())
        .with_body(body);
    let limits = MultipartConfig {
        max_file_size: 16,
        ..MultipartConfig::default()
    };
    let parser = brrtbind::binder::JsonBodyParser;
    let binder = Binder::with_parser(&ctx, &parser, limits);
    assert!(matches!(
        binder.bind_file("file", true),
        Err(BindingError::BodyParse { .. })
    ));
}

#[test]
fn test_custom_body_parser() {
    let schema = SchemaDescriptor::builder("Pair")
        .field(Field::new("key", FieldType::Str))
        .field(Field::new("value", FieldType::Int))
        .build()
        .unwrap();
    // `key=value` bodies instead of JSON
    let parser = |raw: &[u8]| -> Result<Value, String> {
        let text = std::str::from_utf8(raw).map_err(|e| e.to_string())?;
        let (k, v) = text.split_once('=').ok_or("expected key=value")?;
        Ok(json!({"key": k, "value": v}))
    };

    let ctx = RequestContext::new(Method::POST, "/pair").with_body("answer=42");
    let binder = Binder::with_parser(&ctx, &parser, MultipartConfig::default());
    let inst = binder.bind("pair", &schema, Source::BodyJson).unwrap();
    assert_eq!(inst.get_i64("value"), Some(42));

    let bad = RequestContext::new(Method::POST, "/pair").with_body("nonsense");
    let binder = Binder::with_parser(&bad, &parser, MultipartConfig::default());
    match binder.bind("pair", &schema, Source::BodyJson).unwrap_err() {
        BindingError::BodyParse { reason } => assert_eq!(reason, "expected key=value"),
        other => panic!("unexpected: {other}"),
    }
}

#[test]
fn test_body_null_only_where_default_is_null() {
    let schema = SchemaDescriptor::builder("Filters")
        .field(Field::new("limit", FieldType::Int).default(100))
        .field(Field::new("offset", FieldType::Int).optional())
        .build()
        .unwrap();
    let ok = RequestContext::new(Method::POST, "/f").with_json(&json!({"offset": null}));
    let inst = bind(&schema, &ok, Source::BodyJson).unwrap();
    assert_eq!(inst.get("offset"), Some(&Value::Null));
    assert_eq!(inst.get_i64("limit"), Some(100));

    let bad = RequestContext::new(Method::POST, "/f").with_json(&json!({"limit": null}));
    let err = bind(&schema, &bad, Source::BodyJson).unwrap_err();
    assert_eq!(err.errors()[0].kind, "null_not_allowed");
}

#[test]
fn test_lax_body_coercion() {
    let schema = SchemaDescriptor::builder("Common")
        .field(Field::new("code", FieldType::Int))
        .field(Field::new("msg", FieldType::Str))
        .build()
        .unwrap();
    let ctx = RequestContext::new(Method::POST, "/test").with_json(&json!({"code": "7", "msg": 12}));
    let inst = bind(&schema, &ctx, Source::BodyJson).unwrap();
    assert_eq!(inst.to_value(), json!({"code": 7, "msg": "12"}));
}
