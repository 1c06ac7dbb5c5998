use super::coerce::CoercionError;
use std::fmt;

/// Schema registry misconfiguration.
///
/// Returned by [`SchemaBuilder::build`](super::SchemaBuilder::build) and
/// [`SchemaRegistry::define`](super::SchemaRegistry::define). Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDefinitionError {
    /// A field was declared with an empty name
    EmptyFieldName {
        /// Schema being defined
        schema: String,
    },
    /// The same field name was declared twice in one schema body
    DuplicateField {
        /// Schema being defined
        schema: String,
        /// Repeated field name
        field: String,
    },
    /// Two effective fields resolve to the same external name
    DuplicateExternalName {
        /// Schema being defined
        schema: String,
        /// Colliding external name
        external: String,
    },
    /// A default value does not match the declared field type
    InvalidDefault {
        /// Schema being defined
        schema: String,
        /// Offending field
        field: String,
        /// Declared type, rendered
        expected: String,
        /// Coercion failure
        reason: CoercionError,
    },
    /// A schema with this name is already registered
    DuplicateSchema {
        /// Schema name
        schema: String,
    },
}

impl fmt::Display for SchemaDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDefinitionError::EmptyFieldName { schema } => {
                write!(f, "schema '{schema}': field name must not be empty")
            }
            SchemaDefinitionError::DuplicateField { schema, field } => {
                write!(f, "schema '{schema}': field '{field}' declared more than once")
            }
            SchemaDefinitionError::DuplicateExternalName { schema, external } => {
                write!(
                    f,
                    "schema '{schema}': external name '{external}' is used by more than one field"
                )
            }
            SchemaDefinitionError::InvalidDefault {
                schema,
                field,
                expected,
                reason,
            } => {
                write!(
                    f,
                    "schema '{schema}': default of field '{field}' is not a valid {expected}: {}",
                    reason.msg
                )
            }
            SchemaDefinitionError::DuplicateSchema { schema } => {
                write!(f, "schema '{schema}' is already defined")
            }
        }
    }
}

impl std::error::Error for SchemaDefinitionError {}

/// Error raised when reading or updating a bound [`Instance`](super::Instance).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    /// The schema has no field with this internal name
    UnknownField {
        /// Schema name
        schema: String,
        /// Requested field
        field: String,
    },
    /// A required field has no value
    MissingField {
        /// Schema name
        schema: String,
        /// Missing field
        field: String,
    },
    /// A value could not be coerced to the field type
    InvalidValue {
        /// Field name
        field: String,
        /// Coercion failure
        reason: CoercionError,
    },
    /// A typed getter found a value of another JSON type
    WrongType {
        /// Field name
        field: String,
        /// Expected JSON type
        expected: &'static str,
    },
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::UnknownField { schema, field } => {
                write!(f, "schema '{schema}' has no field '{field}'")
            }
            InstanceError::MissingField { schema, field } => {
                write!(f, "schema '{schema}': required field '{field}' has no value")
            }
            InstanceError::InvalidValue { field, reason } => {
                write!(f, "invalid value for field '{field}': {}", reason.msg)
            }
            InstanceError::WrongType { field, expected } => {
                write!(f, "field '{field}' is not a {expected}")
            }
        }
    }
}

impl std::error::Error for InstanceError {}
