use crate::binder::{Bound, FieldError};
use crate::schema::{coerce_json, Instance, SchemaDescriptor};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Content type of every envelope produced here
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Response schema per status code, attached to a route.
pub type ResponseBindings = BTreeMap<u16, Arc<SchemaDescriptor>>;

/// What a handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Plain value, answered with status 200
    Value(Value),
    /// Value with an explicit status code
    Status(u16, Value),
}

impl Reply {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Reply::Value(_) => 200,
            Reply::Status(status, _) => *status,
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (u16, Value) {
        match self {
            Reply::Value(v) => (200, v),
            Reply::Status(s, v) => (s, v),
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Value(value)
    }
}

impl From<Instance> for Reply {
    fn from(instance: Instance) -> Self {
        Reply::Value(instance.to_value())
    }
}

impl From<(u16, Value)> for Reply {
    fn from((status, value): (u16, Value)) -> Self {
        Reply::Status(status, value)
    }
}

/// A request handler: a pure function of its bound parameters.
///
/// Implemented for every `Fn(&Bound) -> anyhow::Result<Reply>`; returning an
/// error answers the request with HTTP 500.
pub trait Handler: Send + Sync {
    fn call(&self, bound: &Bound) -> anyhow::Result<Reply>;
}

impl<F> Handler for F
where
    F: Fn(&Bound) -> anyhow::Result<Reply> + Send + Sync,
{
    fn call(&self, bound: &Bound) -> anyhow::Result<Reply> {
        self(bound)
    }
}

/// Serialized response: status, JSON body and content type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: Value,
    pub content_type: &'static str,
}

impl ResponseEnvelope {
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            content_type: JSON_CONTENT_TYPE,
        }
    }

    /// `{"error": message}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Serialized body
    #[must_use]
    pub fn body_bytes(&self) -> Vec<u8> {
        self.body.to_string().into_bytes()
    }
}

/// Handler value incompatible with the response schema of its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    pub status: u16,
    pub schema: String,
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "response for status {} does not match schema '{}'",
            self.status, self.schema
        )?;
        for e in &self.errors {
            write!(f, "; {}: {}", e.loc.join("."), e.msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for ResponseError {}

/// Serialize `value` for `status` against the declared response schema.
///
/// With a schema for `status`, only declared fields are emitted, in
/// declaration order, under external names. Without one the value passes
/// through unchanged.
///
/// # Arguments
///
/// * `responses` - Response schemas of the matched route
/// * `status` - Status code the handler answered with
/// * `value` - Handler value
///
/// # Returns
///
/// A JSON [`ResponseEnvelope`] carrying `status`
///
/// # Errors
///
/// [`ResponseError`] when the value is not an object or misses a required
/// declared field, or a field fails coercion.
pub fn dispatch(
    responses: &ResponseBindings,
    status: u16,
    value: Value,
) -> Result<ResponseEnvelope, ResponseError> {
    let Some(schema) = responses.get(&status) else {
        debug!(status, schema = "none", "Response dispatched");
        return Ok(ResponseEnvelope::json(status, value));
    };
    let body = shape(schema, &value).map_err(|errors| ResponseError {
        status,
        schema: schema.name().to_string(),
        errors,
    })?;
    debug!(status, schema = schema.name(), "Response dispatched");
    Ok(ResponseEnvelope::json(status, body))
}

/// [`dispatch`] for a handler [`Reply`]
///
/// # Errors
///
/// See [`dispatch`].
pub fn dispatch_reply(
    responses: &ResponseBindings,
    reply: Reply,
) -> Result<ResponseEnvelope, ResponseError> {
    let (status, value) = reply.into_parts();
    dispatch(responses, status, value)
}

/// Project `value` onto `schema`: fields are read by internal name, falling
/// back to the external name, and written under external names.
///
/// Undeclared keys are dropped and missing fields take their default.
///
/// # Errors
///
/// Every field error of the projection, located under `response`.
pub fn shape(schema: &SchemaDescriptor, value: &Value) -> Result<Value, Vec<FieldError>> {
    const LOC: &str = "response";
    let Value::Object(obj) = value else {
        return Err(vec![FieldError::new(
            "model_attributes_type",
            vec![LOC.to_string()],
            "Input should be a valid object",
        )]);
    };

    let mut out = Map::with_capacity(schema.fields().len());
    let mut errors = Vec::new();
    for field in schema.fields() {
        let key = field.external_name();
        let found = obj.get(field.name()).or_else(|| obj.get(key));
        let shaped = match found {
            Some(Value::Null) if field.is_nullable() => Ok(Value::Null),
            Some(v) => coerce_json(field.ty(), v).map_err(|e| FieldError::coercion(LOC, key, e)),
            None => field
                .default_value()
                .cloned()
                .ok_or_else(|| FieldError::missing(LOC, key)),
        };
        match shaped {
            Ok(v) => {
                out.insert(key.to_string(), v);
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(Value::Object(out))
    } else {
        Err(errors)
    }
}
