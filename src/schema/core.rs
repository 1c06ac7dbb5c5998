use super::coerce::coerce_json;
use super::error::{InstanceError, SchemaDefinitionError};
use super::types::Field;
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Function mapping an internal field name to its external name.
pub type AliasGenerator = fn(&str) -> String;

/// Immutable schema definition.
///
/// Built once at startup through [`SchemaBuilder`] and shared via `Arc`.
/// The effective field set (parent fields merged with the schema's own) and
/// every field's external name are resolved when the schema is built, never
/// on access.
#[derive(Debug)]
pub struct SchemaDescriptor {
    name: Arc<str>,
    parent: Option<Arc<SchemaDescriptor>>,
    own_fields: Vec<Field>,
    fields: Vec<Field>,
    alias_generator: Option<AliasGenerator>,
}

impl SchemaDescriptor {
    /// Start declaring a schema.
    #[must_use]
    pub fn builder(name: &str) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Arc<SchemaDescriptor>> {
        self.parent.as_ref()
    }

    /// Effective fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields declared on this schema itself
    #[must_use]
    pub fn own_fields(&self) -> &[Field] {
        &self.own_fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    #[must_use]
    pub fn field_by_external(&self, external: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.external_name() == external)
    }

    #[must_use]
    pub fn alias_generator(&self) -> Option<AliasGenerator> {
        self.alias_generator
    }

    /// True when `self` is `other` or extends it, directly or transitively.
    #[must_use]
    pub fn extends(&self, other: &SchemaDescriptor) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.parent.as_ref().is_some_and(|p| p.extends(other))
    }

    /// Build an instance from already-coerced values keyed by internal name.
    ///
    /// Fields missing from `values` take their default; required fields
    /// without a value are reported.
    pub fn instantiate(
        self: &Arc<Self>,
        values: &Map<String, Value>,
    ) -> Result<Instance, InstanceError> {
        let mut out = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match values.get(field.name()) {
                Some(Value::Null) if field.is_nullable() => Value::Null,
                Some(v) => coerce_json(field.ty(), v).map_err(|reason| {
                    InstanceError::InvalidValue {
                        field: field.name().to_string(),
                        reason,
                    }
                })?,
                None => match field.default_value() {
                    Some(d) => d.clone(),
                    None => {
                        return Err(InstanceError::MissingField {
                            schema: self.name.to_string(),
                            field: field.name().to_string(),
                        })
                    }
                },
            };
            out.push((Arc::clone(&field.name), value));
        }
        Ok(Instance::new(Arc::clone(self), out))
    }
}

/// Fluent declaration of a [`SchemaDescriptor`].
///
/// ```rust
/// use brrtbind::schema::{Field, FieldType, SchemaDescriptor};
///
/// let common = SchemaDescriptor::builder("CommonSchema")
///     .field(Field::new("code", FieldType::Int))
///     .field(Field::new("msg", FieldType::Str))
///     .build()
///     .unwrap();
/// let test = SchemaDescriptor::builder("TestSchema")
///     .extends(&common)
///     .field(Field::new("name", FieldType::Str).default("world"))
///     .build()
///     .unwrap();
/// assert_eq!(test.fields().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    parent: Option<Arc<SchemaDescriptor>>,
    fields: Vec<Field>,
    alias_generator: Option<AliasGenerator>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            fields: Vec::new(),
            alias_generator: None,
        }
    }

    /// Inherit the parent's effective fields (and alias generator, unless one
    /// is set on this builder).
    #[must_use]
    pub fn extends(mut self, parent: &Arc<SchemaDescriptor>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn alias_generator(mut self, generator: AliasGenerator) -> Self {
        self.alias_generator = Some(generator);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate the declaration and resolve the effective field set.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] for empty or repeated field names,
    /// defaults inconsistent with their declared type, and colliding external
    /// names.
    pub fn build(self) -> Result<Arc<SchemaDescriptor>, SchemaDefinitionError> {
        let SchemaBuilder {
            name,
            parent,
            fields: declared,
            alias_generator,
        } = self;

        let mut seen = HashSet::with_capacity(declared.len());
        let mut own_fields = Vec::with_capacity(declared.len());
        for mut field in declared {
            if field.name().is_empty() {
                return Err(SchemaDefinitionError::EmptyFieldName { schema: name });
            }
            if !seen.insert(Arc::clone(&field.name)) {
                return Err(SchemaDefinitionError::DuplicateField {
                    schema: name,
                    field: field.name().to_string(),
                });
            }
            field.default = match field.default.take() {
                None => None,
                Some(Value::Null) => Some(Value::Null),
                Some(d) => Some(coerce_json(field.ty(), &d).map_err(|reason| {
                    SchemaDefinitionError::InvalidDefault {
                        schema: name.clone(),
                        field: field.name().to_string(),
                        expected: field.ty().to_string(),
                        reason,
                    }
                })?),
            };
            own_fields.push(field);
        }

        // Parent order first; a redeclared field replaces the parent's in place.
        let mut fields: Vec<Field> = parent
            .as_ref()
            .map(|p| p.fields.clone())
            .unwrap_or_default();
        for field in &own_fields {
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(slot) => *slot = field.clone(),
                None => fields.push(field.clone()),
            }
        }

        let alias_generator =
            alias_generator.or_else(|| parent.as_ref().and_then(|p| p.alias_generator));
        let mut externals = HashSet::with_capacity(fields.len());
        for field in &mut fields {
            field.external = match (&field.alias, alias_generator) {
                (Some(alias), _) => Arc::clone(alias),
                (None, Some(generate)) => Arc::from(generate(field.name()).as_str()),
                (None, None) => Arc::clone(&field.name),
            };
            if !externals.insert(Arc::clone(&field.external)) {
                return Err(SchemaDefinitionError::DuplicateExternalName {
                    schema: name,
                    external: field.external_name().to_string(),
                });
            }
        }

        debug!(
            schema = %name,
            parent = parent.as_ref().map(|p| p.name()),
            field_count = fields.len(),
            aliased = alias_generator.is_some(),
            "Schema defined"
        );

        Ok(Arc::new(SchemaDescriptor {
            name: Arc::from(name.as_str()),
            parent,
            own_fields,
            fields,
            alias_generator,
        }))
    }
}

/// Named collection of schemas, read-only once startup completes.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<SchemaDescriptor>>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register a schema.
    ///
    /// # Errors
    ///
    /// Fails when the declaration is invalid or the name is already taken.
    pub fn define(
        &mut self,
        builder: SchemaBuilder,
    ) -> Result<Arc<SchemaDescriptor>, SchemaDefinitionError> {
        if self.schemas.contains_key(builder.name()) {
            return Err(SchemaDefinitionError::DuplicateSchema {
                schema: builder.name().to_string(),
            });
        }
        let schema = builder.build()?;
        self.schemas
            .insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<SchemaDescriptor>> {
        self.schemas.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SchemaDescriptor>> {
        self.schemas.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// A validated schema value produced by binding.
///
/// Holds one value per effective field, in declaration order, keyed by
/// internal name.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    schema: Arc<SchemaDescriptor>,
    values: Vec<(Arc<str>, Value)>,
}

impl PartialEq for SchemaDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Instance {
    pub(crate) fn new(schema: Arc<SchemaDescriptor>, values: Vec<(Arc<str>, Value)>) -> Self {
        Self { schema, values }
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.schema
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Integer value of a field, failing on unknown fields or non-integers.
    pub fn require_i64(&self, name: &str) -> Result<i64, InstanceError> {
        self.lookup(name)?
            .as_i64()
            .ok_or_else(|| InstanceError::WrongType {
                field: name.to_string(),
                expected: "integer",
            })
    }

    /// String value of a field, failing on unknown fields or non-strings.
    pub fn require_str(&self, name: &str) -> Result<&str, InstanceError> {
        self.lookup(name)?
            .as_str()
            .ok_or_else(|| InstanceError::WrongType {
                field: name.to_string(),
                expected: "string",
            })
    }

    fn lookup(&self, name: &str) -> Result<&Value, InstanceError> {
        self.get(name).ok_or_else(|| InstanceError::UnknownField {
            schema: self.schema.name().to_string(),
            field: name.to_string(),
        })
    }

    /// Replace a field value, coercing it to the declared type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), InstanceError> {
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| InstanceError::UnknownField {
                schema: self.schema.name().to_string(),
                field: name.to_string(),
            })?;
        let value = value.into();
        let value = if value.is_null() && field.is_nullable() {
            value
        } else {
            coerce_json(field.ty(), &value).map_err(|reason| InstanceError::InvalidValue {
                field: name.to_string(),
                reason,
            })?
        };
        if let Some(slot) = self.values.iter_mut().find(|(k, _)| k.as_ref() == name) {
            slot.1 = value;
        }
        Ok(())
    }

    /// Object keyed by internal field names.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    /// Object keyed by external (aliased) field names.
    #[must_use]
    pub fn to_external_value(&self) -> Value {
        Value::Object(
            self.schema
                .fields()
                .iter()
                .zip(&self.values)
                .map(|(field, (_, v))| (field.external_name().to_string(), v.clone()))
                .collect(),
        )
    }

    /// Deserialize the internal-name view into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_value())
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (k, v) in &self.values {
            map.serialize_entry(k.as_ref(), v)?;
        }
        map.end()
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        instance.to_value()
    }
}
