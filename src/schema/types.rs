use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Declared type of a schema field.
///
/// Values are carried as JSON internally; the declared type decides how raw
/// strings (path, query, header, form) and JSON documents (body) are coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Signed 64-bit integer
    Int,
    /// 64-bit float, finite values only
    Float,
    /// UTF-8 string, passed through
    Str,
    /// Boolean (`true/false/1/0/yes/no/on/off` from strings)
    Bool,
    /// ISO-8601 calendar date (`YYYY-MM-DD`)
    Date,
    /// Ordered sequence of the item type
    List(Box<FieldType>),
    /// Any JSON value, no coercion
    Any,
}

impl FieldType {
    /// Shorthand for `FieldType::List(Box::new(item))`
    #[must_use]
    pub fn list_of(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Str => write!(f, "str"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Date => write!(f, "date"),
            FieldType::List(item) => write!(f, "list[{item}]"),
            FieldType::Any => write!(f, "any"),
        }
    }
}

/// A single field declaration.
///
/// A field without a default is required. A default of `Value::Null` makes the
/// field optional with an absent value of `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) name: Arc<str>,
    pub(crate) ty: FieldType,
    pub(crate) default: Option<Value>,
    pub(crate) alias: Option<Arc<str>>,
    /// Resolved at definition time: explicit alias, generated alias, or name
    pub(crate) external: Arc<str>,
}

impl Field {
    #[must_use]
    pub fn new(name: &str, ty: FieldType) -> Self {
        let name: Arc<str> = Arc::from(name);
        Self {
            external: Arc::clone(&name),
            name,
            ty,
            default: None,
            alias: None,
        }
    }

    /// Declare a default value; the field becomes optional.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Optional field defaulting to `null`.
    #[must_use]
    pub fn optional(self) -> Self {
        self.default(Value::Null)
    }

    /// External name used at the request/response boundary.
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        let alias: Arc<str> = Arc::from(alias);
        self.external = Arc::clone(&alias);
        self.alias = Some(alias);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Whether `null` is an accepted value (optional field defaulting to `null`)
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self.default, Some(Value::Null)) || self.ty == FieldType::Any
    }

    /// The explicitly declared alias, if any
    #[must_use]
    pub fn explicit_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name used for parsing and serialization at the boundary
    #[must_use]
    pub fn external_name(&self) -> &str {
        &self.external
    }
}
