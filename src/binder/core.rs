use super::context::RequestContext;
use super::error::{BindingError, FieldError};
use super::form::FormData;
use super::multipart::{MultipartConfig, MultipartError, UploadedFile};
use super::parser::{BodyParser, JsonBodyParser};
use crate::schema::{coerce_json, coerce_many, coerce_str, Field, FieldType, Instance, SchemaDescriptor};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Request location a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    Path,
    Query,
    Header,
    /// Urlencoded fields or multipart text parts
    Form,
    /// Parsed request body (or a multipart text part holding a JSON document)
    BodyJson,
    /// Multipart part carrying a filename
    File,
}

impl Source {
    /// Name used as the first `loc` element of field errors
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Path => "path",
            Source::Query => "query",
            Source::Header => "header",
            Source::Form => "form",
            Source::BodyJson => "body",
            Source::File => "file",
        }
    }

    /// Binding stage: path, then query/header, then form/body, then files.
    fn rank(self) -> u8 {
        match self {
            Source::Path => 0,
            Source::Query | Source::Header => 1,
            Source::Form | Source::BodyJson => 2,
            Source::File => 3,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared handler parameter.
#[derive(Debug, Clone)]
pub enum Param {
    /// Schema-typed value bound from one request location
    Schema {
        name: Arc<str>,
        source: Source,
        schema: Arc<SchemaDescriptor>,
    },
    /// Uploaded file from a multipart body
    File { name: Arc<str>, required: bool },
}

impl Param {
    #[must_use]
    pub fn new(name: &str, source: Source, schema: &Arc<SchemaDescriptor>) -> Self {
        Param::Schema {
            name: Arc::from(name),
            source,
            schema: Arc::clone(schema),
        }
    }

    #[must_use]
    pub fn path(name: &str, schema: &Arc<SchemaDescriptor>) -> Self {
        Self::new(name, Source::Path, schema)
    }

    #[must_use]
    pub fn query(name: &str, schema: &Arc<SchemaDescriptor>) -> Self {
        Self::new(name, Source::Query, schema)
    }

    #[must_use]
    pub fn header(name: &str, schema: &Arc<SchemaDescriptor>) -> Self {
        Self::new(name, Source::Header, schema)
    }

    #[must_use]
    pub fn form(name: &str, schema: &Arc<SchemaDescriptor>) -> Self {
        Self::new(name, Source::Form, schema)
    }

    #[must_use]
    pub fn body(name: &str, schema: &Arc<SchemaDescriptor>) -> Self {
        Self::new(name, Source::BodyJson, schema)
    }

    /// Required uploaded file
    #[must_use]
    pub fn file(name: &str) -> Self {
        Param::File {
            name: Arc::from(name),
            required: true,
        }
    }

    #[must_use]
    pub fn optional_file(name: &str) -> Self {
        Param::File {
            name: Arc::from(name),
            required: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Param::Schema { name, .. } | Param::File { name, .. } => name,
        }
    }

    #[must_use]
    pub fn source(&self) -> Source {
        match self {
            Param::Schema { source, .. } => *source,
            Param::File { .. } => Source::File,
        }
    }
}

#[derive(Debug, Clone)]
enum BoundValue {
    Instance(Instance),
    File(Option<UploadedFile>),
}

/// Validated handler inputs, keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct Bound {
    values: Vec<(Arc<str>, BoundValue)>,
}

impl Bound {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bound schema instance under `name`
    pub fn insert_instance(&mut self, name: &str, instance: Instance) {
        self.values
            .push((Arc::from(name), BoundValue::Instance(instance)));
    }

    pub fn insert_file(&mut self, name: &str, file: Option<UploadedFile>) {
        self.values.push((Arc::from(name), BoundValue::File(file)));
    }

    /// Bound schema instance for `name`, if any
    #[must_use]
    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.values.iter().find_map(|(k, v)| match v {
            BoundValue::Instance(i) if k.as_ref() == name => Some(i),
            _ => None,
        })
    }

    /// Bound schema instance for `name`.
    ///
    /// # Errors
    ///
    /// Fails when the route declares no schema parameter of that name.
    pub fn require(&self, name: &str) -> anyhow::Result<&Instance> {
        self.instance(name)
            .ok_or_else(|| anyhow::anyhow!("no schema parameter bound as '{name}'"))
    }

    /// Single field of a bound instance, by internal name
    #[must_use]
    pub fn field(&self, param: &str, field: &str) -> Option<&Value> {
        self.instance(param).and_then(|i| i.get(field))
    }

    /// Deserialize a bound instance into a typed struct.
    ///
    /// Keys are internal field names, so `T` derives `Deserialize` against
    /// the Rust-side names rather than aliases.
    ///
    /// # Errors
    ///
    /// Fails when no instance is bound under `name` or it does not
    /// deserialize into `T`.
    pub fn parse<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        Ok(self.require(name)?.deserialize()?)
    }

    /// Uploaded file bound under `name`; `None` for absent optional files
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.values.iter().find_map(|(k, v)| match v {
            BoundValue::File(f) if k.as_ref() == name => f.as_ref(),
            _ => None,
        })
    }

    /// Uploaded file bound under `name`.
    ///
    /// # Errors
    ///
    /// Fails when no file was bound under `name`.
    pub fn require_file(&self, name: &str) -> anyhow::Result<&UploadedFile> {
        self.file(name)
            .ok_or_else(|| anyhow::anyhow!("no file bound as '{name}'"))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-request binder.
///
/// Borrows the request context and decodes the form body lazily, at most once,
/// however many form, multipart-body or file parameters the route declares.
pub struct Binder<'a> {
    ctx: &'a RequestContext,
    parser: &'a dyn BodyParser,
    multipart: MultipartConfig,
    form: OnceCell<Result<FormData, MultipartError>>,
}

impl<'a> Binder<'a> {
    /// Binder with the default JSON parser and multipart limits.
    #[must_use]
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self::with_parser(ctx, &JsonBodyParser, MultipartConfig::default())
    }

    /// Binder with an explicit body parser and multipart limits.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Request being bound
    /// * `parser` - Parser for JSON body parameters
    /// * `multipart` - Size and count limits for multipart bodies
    #[must_use]
    pub fn with_parser(
        ctx: &'a RequestContext,
        parser: &'a dyn BodyParser,
        multipart: MultipartConfig,
    ) -> Self {
        Self {
            ctx,
            parser,
            multipart,
            form: OnceCell::new(),
        }
    }

    fn form(&self) -> Result<&FormData, BindingError> {
        self.form
            .get_or_init(|| FormData::from_request(self.ctx, &self.multipart))
            .as_ref()
            .map_err(|e| BindingError::BodyParse {
                reason: e.to_string(),
            })
    }

    /// Bind every declared parameter in stage order; the first failure wins.
    ///
    /// # Arguments
    ///
    /// * `params` - Parameter declarations of the matched route
    ///
    /// # Returns
    ///
    /// A [`Bound`] holding one entry per parameter
    ///
    /// # Errors
    ///
    /// Returns the [`BindingError`] of the first failing parameter.
    pub fn bind_all(&self, params: &[Param]) -> Result<Bound, BindingError> {
        let mut ordered: Vec<&Param> = params.iter().collect();
        ordered.sort_by_key(|p| p.source().rank());

        let mut bound = Bound::new();
        for param in ordered {
            match param {
                Param::Schema {
                    name,
                    source,
                    schema,
                } => {
                    let instance = self.bind(name, schema, *source).map_err(|err| {
                        debug!(
                            request_id = %self.ctx.request_id,
                            param = %name,
                            source = %source,
                            schema = schema.name(),
                            error = %err,
                            "Parameter binding failed"
                        );
                        err
                    })?;
                    bound.insert_instance(name, instance);
                }
                Param::File { name, required } => {
                    let file = self.bind_file(name, *required)?;
                    bound.insert_file(name, file);
                }
            }
        }
        Ok(bound)
    }

    /// Bind one schema parameter from `source`.
    ///
    /// # Arguments
    ///
    /// * `name` - Parameter name; body parameters of multipart requests read
    ///   their JSON document from the text part of that name
    /// * `schema` - Schema the location is bound into
    /// * `source` - Request location; files go through [`Binder::bind_file`]
    ///
    /// # Errors
    ///
    /// All field errors of the schema are collected into one [`BindingError`].
    /// `Source::File` is rejected with a `schema_source` validation error.
    pub fn bind(
        &self,
        name: &str,
        schema: &Arc<SchemaDescriptor>,
        source: Source,
    ) -> Result<Instance, BindingError> {
        match source {
            Source::BodyJson => return self.bind_body(name, schema),
            Source::File => {
                return Err(BindingError::Validation {
                    source,
                    errors: vec![FieldError::new(
                        "schema_source",
                        vec![source.as_str().to_string(), name.to_string()],
                        "Uploaded files carry no schema; bind them with bind_file",
                    )],
                })
            }
            _ => {}
        }

        let form = if source == Source::Form {
            Some(self.form()?)
        } else {
            None
        };
        let loc = source.as_str();
        let mut values = Vec::with_capacity(schema.fields().len());
        let mut errors = Vec::new();

        for field in schema.fields() {
            let key = field.external_name();
            let raws: Vec<&str> = match source {
                Source::Path => self.ctx.get_path_param(key).into_iter().collect(),
                Source::Query => self.ctx.query_values(key).collect(),
                Source::Header => self
                    .ctx
                    .headers
                    .iter()
                    .filter(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v.as_str())
                    .collect(),
                Source::Form | Source::File | Source::BodyJson => form
                    .map(|f| f.field_values(key).collect())
                    .unwrap_or_default(),
            };
            match bind_raw(field, &raws, loc) {
                Ok(v) => values.push((Arc::clone(&field.name), v)),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(Instance::new(Arc::clone(schema), values))
        } else {
            Err(BindingError::from_field_errors(source, errors))
        }
    }

    fn bind_body(&self, name: &str, schema: &Arc<SchemaDescriptor>) -> Result<Instance, BindingError> {
        let loc = Source::BodyJson.as_str();
        let missing = || BindingError::RequiredFieldMissing {
            source: Source::BodyJson,
            errors: vec![FieldError::missing(loc, name)],
        };

        let parsed = if self.ctx.is_multipart() {
            let text = self.form()?.text_part(name).ok_or_else(missing)?;
            self.parser.parse(text.as_bytes())
        } else {
            if self.ctx.body.trim_ascii().is_empty() {
                return Err(missing());
            }
            self.parser.parse(&self.ctx.body)
        };
        let doc = parsed.map_err(|e| BindingError::BodyParse { reason: e.reason })?;

        let Value::Object(obj) = doc else {
            return Err(BindingError::Validation {
                source: Source::BodyJson,
                errors: vec![FieldError::new(
                    "model_attributes_type",
                    vec![loc.to_string(), name.to_string()],
                    "Input should be a valid object",
                )],
            });
        };

        let mut values = Vec::with_capacity(schema.fields().len());
        let mut errors = Vec::new();
        for field in schema.fields() {
            let key = field.external_name();
            let value = match obj.get(key) {
                Some(Value::Null) if field.is_nullable() => Ok(Value::Null),
                Some(v) => {
                    coerce_json(field.ty(), v).map_err(|e| FieldError::coercion(loc, key, e))
                }
                None => field
                    .default_value()
                    .cloned()
                    .ok_or_else(|| FieldError::missing(loc, key)),
            };
            match value {
                Ok(v) => values.push((Arc::clone(&field.name), v)),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(Instance::new(Arc::clone(schema), values))
        } else {
            Err(BindingError::from_field_errors(Source::BodyJson, errors))
        }
    }

    /// Bind an uploaded file by multipart field name.
    ///
    /// # Arguments
    ///
    /// * `name` - Multipart field name of the file part
    /// * `required` - Whether a missing part is an error
    ///
    /// # Returns
    ///
    /// The file, or `None` when it is optional and absent
    ///
    /// # Errors
    ///
    /// `RequiredFieldMissing` when `required` and no such file part exists;
    /// `BodyParse` when the multipart body is malformed.
    pub fn bind_file(&self, name: &str, required: bool) -> Result<Option<UploadedFile>, BindingError> {
        match self.form()?.file(name) {
            Some(file) => Ok(Some(file.clone())),
            None if required => Err(BindingError::RequiredFieldMissing {
                source: Source::File,
                errors: vec![FieldError::missing(Source::File.as_str(), name)],
            }),
            None => Ok(None),
        }
    }
}

/// Coerce the raw string occurrences of one field.
fn bind_raw(field: &Field, raws: &[&str], loc: &str) -> Result<Value, FieldError> {
    let key = field.external_name();
    let Some(last) = raws.last() else {
        return field
            .default_value()
            .cloned()
            .ok_or_else(|| FieldError::missing(loc, key));
    };
    let coerced = match field.ty() {
        FieldType::List(item) => coerce_many(item, raws.iter().copied()),
        ty => coerce_str(ty, last),
    };
    coerced.map_err(|e| FieldError::coercion(loc, key, e))
}

/// Bind one schema from `source` with the default parser and limits.
///
/// # Errors
///
/// See [`Binder::bind`].
pub fn bind(
    descriptor: &Arc<SchemaDescriptor>,
    ctx: &RequestContext,
    source: Source,
) -> Result<Instance, BindingError> {
    Binder::new(ctx).bind(descriptor.name(), descriptor, source)
}
