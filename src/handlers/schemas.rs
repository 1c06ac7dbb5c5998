use crate::schema::{alias, Field, FieldType, SchemaDefinitionError, SchemaDescriptor, SchemaRegistry};
use serde_json::json;
use std::sync::Arc;

/// Schemas of the demo API, defined once at startup.
#[derive(Debug, Clone)]
pub struct DemoSchemas {
    pub error: Arc<SchemaDescriptor>,
    pub common: Arc<SchemaDescriptor>,
    pub test: Arc<SchemaDescriptor>,
    pub filters: Arc<SchemaDescriptor>,
    pub user_details: Arc<SchemaDescriptor>,
    pub camel: Arc<SchemaDescriptor>,
    /// `?name=` of `/hello`
    pub hello_query: Arc<SchemaDescriptor>,
    /// `{a}` and `{b}` of `/math/{a}and{b}`
    pub math_path: Arc<SchemaDescriptor>,
    /// `{item_id}` of `/filter/{item_id}`
    pub item_path: Arc<SchemaDescriptor>,
    /// `x` header of `/test`
    pub test_headers: Arc<SchemaDescriptor>,
    /// Required `?q=` of `POST /filter/{item_id}`
    pub search_query: Arc<SchemaDescriptor>,
}

impl DemoSchemas {
    /// Define every demo schema in `registry`.
    ///
    /// # Errors
    ///
    /// Fails if a schema is invalid or `registry` already holds one of the
    /// names.
    pub fn define(registry: &mut SchemaRegistry) -> Result<Self, SchemaDefinitionError> {
        let error = registry.define(
            SchemaDescriptor::builder("Error").field(Field::new("message", FieldType::Str)),
        )?;
        let common = registry.define(
            SchemaDescriptor::builder("CommonSchema")
                .field(Field::new("code", FieldType::Int))
                .field(Field::new("msg", FieldType::Str)),
        )?;
        let test = registry.define(
            SchemaDescriptor::builder("TestSchema")
                .extends(&common)
                .field(Field::new("name", FieldType::Str).default("world")),
        )?;
        let filters = registry.define(
            SchemaDescriptor::builder("Filters")
                .field(Field::new("limit", FieldType::Int).default(100))
                .field(Field::new("offset", FieldType::Int).optional())
                .field(Field::new("query", FieldType::Str).optional())
                .field(
                    Field::new("category__in", FieldType::list_of(FieldType::Str))
                        .default(json!([]))
                        .alias("categories"),
                ),
        )?;
        let user_details = registry.define(
            SchemaDescriptor::builder("UserDetails")
                .field(Field::new("first_name", FieldType::Str))
                .field(Field::new("last_name", FieldType::Str))
                .field(Field::new("birthdate", FieldType::Date)),
        )?;
        let camel = registry.define(
            SchemaDescriptor::builder("CamelModelSchema")
                .field(Field::new("str_field_name", FieldType::Str))
                .field(Field::new("float_field_name", FieldType::Float))
                .alias_generator(alias::to_camel),
        )?;

        let hello_query = registry.define(
            SchemaDescriptor::builder("HelloQuery").field(Field::new("name", FieldType::Str).optional()),
        )?;
        let math_path = registry.define(
            SchemaDescriptor::builder("MathPath")
                .field(Field::new("a", FieldType::Int))
                .field(Field::new("b", FieldType::Int)),
        )?;
        let item_path = registry.define(
            SchemaDescriptor::builder("ItemPath").field(Field::new("item_id", FieldType::Int)),
        )?;
        let test_headers = registry.define(
            SchemaDescriptor::builder("TestHeaders")
                .field(Field::new("x", FieldType::Str).default("x-header-value")),
        )?;
        let search_query = registry.define(
            SchemaDescriptor::builder("SearchQuery").field(Field::new("q", FieldType::Str)),
        )?;

        Ok(Self {
            error,
            common,
            test,
            filters,
            user_details,
            camel,
            hello_query,
            math_path,
            item_path,
            test_headers,
            search_query,
        })
    }
}
