//! Field-level coercion shared by request binding, response shaping and
//! default checking.

use super::types::FieldType;
use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;
use std::num::IntErrorKind;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 2^63; integral floats must lie in `[-2^63, 2^63)` to fit an `i64`
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Why a single value could not be coerced to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    /// Machine-readable error type (`int_parsing`, `date_parsing`, ...)
    pub kind: &'static str,
    /// Human-readable message
    pub msg: String,
}

impl CoercionError {
    pub(crate) fn new(kind: &'static str, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }

    fn int() -> Self {
        Self::new(
            "int_parsing",
            "Input should be a valid integer, unable to parse string as an integer",
        )
    }

    fn int_out_of_range() -> Self {
        Self::new(
            "int_parsing_size",
            "Input should be a valid integer, number out of range",
        )
    }

    fn float() -> Self {
        Self::new(
            "float_parsing",
            "Input should be a valid number, unable to parse string as a number",
        )
    }

    fn bool() -> Self {
        Self::new(
            "bool_parsing",
            "Input should be a valid boolean, unable to interpret input",
        )
    }

    fn date() -> Self {
        Self::new(
            "date_parsing",
            "Input should be a valid date in the format YYYY-MM-DD",
        )
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.msg, self.kind)
    }
}

impl std::error::Error for CoercionError {}

/// Coerce a raw string (path segment, query/form value, header) to `ty`.
///
/// A list type coerces the single string as a one-element list; repeated keys
/// go through [`coerce_many`].
pub fn coerce_str(ty: &FieldType, raw: &str) -> Result<Value, CoercionError> {
    match ty {
        FieldType::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    CoercionError::int_out_of_range()
                }
                _ => CoercionError::int(),
            }),
        FieldType::Float => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Value::from(v)),
            _ => Err(CoercionError::float()),
        },
        FieldType::Str | FieldType::Any => Ok(Value::String(raw.to_string())),
        FieldType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "y" | "t" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" | "n" | "f" => Ok(Value::Bool(false)),
            _ => Err(CoercionError::bool()),
        },
        FieldType::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
            .map_err(|_| CoercionError::date()),
        FieldType::List(item) => coerce_many(item, std::iter::once(raw)),
    }
}

/// Coerce repeated raw values (e.g. `?categories=a&categories=b`) into a list,
/// preserving input order.
pub fn coerce_many<'a, I>(item: &FieldType, raws: I) -> Result<Value, CoercionError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Vec::new();
    for (idx, raw) in raws.into_iter().enumerate() {
        let v = coerce_str(item, raw)
            .map_err(|e| CoercionError::new(e.kind, format!("item {idx}: {}", e.msg)))?;
        out.push(v);
    }
    Ok(Value::Array(out))
}

/// Coerce a JSON value (request body, handler output, declared default) to `ty`.
///
/// Coercion is lax in the usual direction: numeric strings are accepted for
/// numbers and numbers for strings. `null` is rejected here; callers decide
/// whether the field accepts it.
pub fn coerce_json(ty: &FieldType, value: &Value) -> Result<Value, CoercionError> {
    if value.is_null() && *ty != FieldType::Any {
        return Err(CoercionError::new("null_not_allowed", "Input should not be null"));
    }
    match ty {
        FieldType::Any => Ok(value.clone()),
        FieldType::Int => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Value::from(i));
                }
                if n.is_u64() {
                    return Err(CoercionError::int_out_of_range());
                }
                match n.as_f64() {
                    Some(f) if f.fract() != 0.0 => Err(CoercionError::new(
                        "int_from_float",
                        "Input should be a valid integer, got a number with a fractional part",
                    )),
                    Some(f) if (-I64_BOUND..I64_BOUND).contains(&f) => Ok(Value::from(f as i64)),
                    _ => Err(CoercionError::int_out_of_range()),
                }
            }
            Value::String(s) => coerce_str(ty, s),
            _ => Err(CoercionError::new("int_type", "Input should be a valid integer")),
        },
        FieldType::Float => match value {
            Value::Number(n) => n
                .as_f64()
                .map(Value::from)
                .ok_or_else(CoercionError::float),
            Value::String(s) => coerce_str(ty, s),
            _ => Err(CoercionError::new("float_type", "Input should be a valid number")),
        },
        FieldType::Str => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(CoercionError::new("string_type", "Input should be a valid string")),
        },
        FieldType::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) => coerce_str(ty, s),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(Value::Bool(false)),
                Some(1) => Ok(Value::Bool(true)),
                _ => Err(CoercionError::bool()),
            },
            _ => Err(CoercionError::new("bool_type", "Input should be a valid boolean")),
        },
        FieldType::Date => match value {
            Value::String(s) => coerce_str(ty, s),
            _ => Err(CoercionError::new("date_type", "Input should be a valid date")),
        },
        FieldType::List(item) => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, v) in items.iter().enumerate() {
                    let coerced = coerce_json(item, v)
                        .map_err(|e| CoercionError::new(e.kind, format!("item {idx}: {}", e.msg)))?;
                    out.push(coerced);
                }
                Ok(Value::Array(out))
            }
            _ => Err(CoercionError::new("list_type", "Input should be a valid list")),
        },
    }
}
