use brrtbind::schema::{
    alias, Field, FieldType, InstanceError, SchemaDefinitionError, SchemaDescriptor,
    SchemaRegistry,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

fn common() -> std::sync::Arc<SchemaDescriptor> {
    SchemaDescriptor::builder("CommonSchema")
        .field(Field::new("code", FieldType::Int))
        .field(Field::new("msg", FieldType::Str))
        .build()
        .unwrap()
}

#[test]
fn test_inheritance_merges_parent_first() {
    let parent = common();
    let child = SchemaDescriptor::builder("TestSchema")
        .extends(&parent)
        .field(Field::new("name", FieldType::Str).default("world"))
        .field(Field::new("code", FieldType::Int).default(1))
        .build()
        .unwrap();

    let names: Vec<&str> = child.fields().iter().map(Field::name).collect();
    assert_eq!(names, vec!["code", "msg", "name"]);
    // redeclared in place with the child's default
    assert_eq!(child.field("code").unwrap().default_value(), Some(&json!(1)));
    assert_eq!(child.own_fields().len(), 2);
    assert!(child.extends(&parent));
    assert!(!parent.extends(&child));
    // parent untouched
    assert!(parent.field("code").unwrap().is_required());
}

#[test]
fn test_invalid_default_rejected() {
    let err = SchemaDescriptor::builder("Bad")
        .field(Field::new("limit", FieldType::Int).default("many"))
        .build()
        .unwrap_err();
    match err {
        SchemaDefinitionError::InvalidDefault { field, expected, .. } => {
            assert_eq!(field, "limit");
            assert_eq!(expected, "int");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_names_rejected() {
    let dup = SchemaDescriptor::builder("Dup")
        .field(Field::new("a", FieldType::Int))
        .field(Field::new("a", FieldType::Str))
        .build();
    assert!(matches!(dup, Err(SchemaDefinitionError::DuplicateField { .. })));

    let clash = SchemaDescriptor::builder("Clash")
        .field(Field::new("a", FieldType::Int).alias("b"))
        .field(Field::new("b", FieldType::Int))
        .build();
    assert!(matches!(
        clash,
        Err(SchemaDefinitionError::DuplicateExternalName { .. })
    ));

    let mut registry = SchemaRegistry::new();
    registry
        .define(SchemaDescriptor::builder("Error").field(Field::new("message", FieldType::Str)))
        .unwrap();
    let again = registry
        .define(SchemaDescriptor::builder("Error").field(Field::new("message", FieldType::Str)));
    assert!(matches!(again, Err(SchemaDefinitionError::DuplicateSchema { .. })));
    assert_eq!(registry.len(), 1);
    assert!(registry.get("Error").is_some());
}

#[test]
fn test_alias_generator_round_trip() {
    let camel = SchemaDescriptor::builder("CamelModelSchema")
        .field(Field::new("str_field_name", FieldType::Str))
        .field(Field::new("float_field_name", FieldType::Float))
        .alias_generator(alias::to_camel)
        .build()
        .unwrap();
    assert_eq!(camel.fields()[0].external_name(), "StrFieldName");
    assert_eq!(camel.fields()[1].external_name(), "FloatFieldName");

    let mut values = Map::new();
    values.insert("str_field_name".into(), json!("abc"));
    values.insert("float_field_name".into(), json!(1.5));
    let inst = camel.instantiate(&values).unwrap();

    let external = inst.to_external_value();
    assert_eq!(external, json!({"StrFieldName": "abc", "FloatFieldName": 1.5}));

    // external keys map back to the same internal values
    let back: Map<String, Value> = camel
        .fields()
        .iter()
        .map(|f| (f.name().to_string(), external[f.external_name()].clone()))
        .collect();
    assert_eq!(camel.instantiate(&back).unwrap(), inst);
}

#[test]
fn test_child_inherits_generator() {
    let base = SchemaDescriptor::builder("Base")
        .field(Field::new("first_name", FieldType::Str))
        .alias_generator(alias::to_lower_camel)
        .build()
        .unwrap();
    let child = SchemaDescriptor::builder("Child")
        .extends(&base)
        .field(Field::new("last_name", FieldType::Str))
        .field(Field::new("nick_name", FieldType::Str).alias("nick"))
        .build()
        .unwrap();
    let externals: Vec<&str> = child.fields().iter().map(Field::external_name).collect();
    assert_eq!(externals, vec!["firstName", "lastName", "nick"]);
}

#[test]
fn test_instance_set_and_deserialize() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Common {
        code: i64,
        msg: String,
    }

    let schema = common();
    let mut values = Map::new();
    values.insert("code".into(), json!(0));
    values.insert("msg".into(), json!("x"));
    let mut inst = schema.instantiate(&values).unwrap();

    inst.set("code", "100").unwrap();
    assert_eq!(inst.get_i64("code"), Some(100));
    assert!(matches!(
        inst.set("code", "abc"),
        Err(InstanceError::InvalidValue { .. })
    ));
    assert!(matches!(
        inst.set("nope", 1),
        Err(InstanceError::UnknownField { .. })
    ));
    assert_eq!(
        inst.deserialize::<Common>().unwrap(),
        Common {
            code: 100,
            msg: "x".into()
        }
    );

    let missing = schema.instantiate(&Map::new()).unwrap_err();
    assert!(matches!(missing, InstanceError::MissingField { .. }));
}
