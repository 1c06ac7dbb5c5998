use super::core::Source;
use crate::schema::CoercionError;
use serde::Serialize;
use std::fmt;

/// One invalid or missing field, reported with its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Error type identifier (`missing`, `int_parsing`, ...)
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Location, e.g. `["query", "categories"]`
    pub loc: Vec<String>,
    /// Human-readable message
    pub msg: String,
}

impl FieldError {
    #[must_use]
    pub fn new(kind: &'static str, loc: Vec<String>, msg: impl Into<String>) -> Self {
        Self {
            kind,
            loc,
            msg: msg.into(),
        }
    }

    /// Required value absent at `[location, field]`
    #[must_use]
    pub fn missing(location: &str, field: &str) -> Self {
        Self::new(
            "missing",
            vec![location.to_string(), field.to_string()],
            "Field required",
        )
    }

    #[must_use]
    pub fn coercion(location: &str, field: &str, err: CoercionError) -> Self {
        Self::new(
            err.kind,
            vec![location.to_string(), field.to_string()],
            err.msg,
        )
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.kind == "missing"
    }
}

/// Per-request binding failure. Short-circuits binding; the handler is never
/// invoked and the request is answered with HTTP 422.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// One or more required values are absent
    RequiredFieldMissing {
        /// Where binding failed
        source: Source,
        /// Every missing field
        errors: Vec<FieldError>,
    },
    /// A path capture could not be coerced to its declared type
    PathCoercion {
        /// Every failing path field
        errors: Vec<FieldError>,
    },
    /// The body had no interpretable structure
    BodyParse {
        /// Parser message
        reason: String,
    },
    /// Aggregate of per-field failures for one schema
    Validation {
        /// Where binding failed
        source: Source,
        /// Every invalid field
        errors: Vec<FieldError>,
    },
}

impl BindingError {
    /// Classify the collected field errors of one schema binding.
    pub(crate) fn from_field_errors(source: Source, errors: Vec<FieldError>) -> Self {
        if source == Source::Path {
            BindingError::PathCoercion { errors }
        } else if errors.iter().all(FieldError::is_missing) {
            BindingError::RequiredFieldMissing { source, errors }
        } else {
            BindingError::Validation { source, errors }
        }
    }

    /// HTTP status the failure maps to
    #[must_use]
    pub fn status(&self) -> u16 {
        422
    }

    /// Short title used as the `error` member of the response body
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            BindingError::RequiredFieldMissing { .. } => "Required field missing",
            BindingError::PathCoercion { .. } => "Path parameter coercion failed",
            BindingError::BodyParse { .. } => "Request body could not be parsed",
            BindingError::Validation { .. } => "Request validation failed",
        }
    }

    /// Every field error carried by this failure
    #[must_use]
    pub fn errors(&self) -> Vec<FieldError> {
        match self {
            BindingError::RequiredFieldMissing { errors, .. }
            | BindingError::PathCoercion { errors }
            | BindingError::Validation { errors, .. } => errors.clone(),
            BindingError::BodyParse { reason } => vec![FieldError::new(
                "json_invalid",
                vec![Source::BodyJson.as_str().to_string()],
                reason.clone(),
            )],
        }
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::BodyParse { reason } => write!(f, "{}: {reason}", self.title()),
            _ => {
                let errors = self.errors();
                write!(f, "{} ({} field error(s)", self.title(), errors.len())?;
                for e in &errors {
                    write!(f, "; {}: {}", e.loc.join("."), e.msg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl std::error::Error for BindingError {}
