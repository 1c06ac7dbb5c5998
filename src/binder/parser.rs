//! Pluggable request body parser.
//!
//! The binder only needs `parse(bytes) -> value`. [`JsonBodyParser`] is the
//! default; any closure `Fn(&[u8]) -> Result<Value, String>` can replace it.

use serde_json::Value;
use std::fmt;

/// Body decode failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyParseError {
    /// Decoder message
    pub reason: String,
}

impl BodyParseError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for BodyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body parse error: {}", self.reason)
    }
}

impl std::error::Error for BodyParseError {}

/// Decodes raw body bytes into a JSON-like value.
pub trait BodyParser: Send + Sync {
    /// Decode the whole body
    fn parse(&self, raw: &[u8]) -> Result<Value, BodyParseError>;
}

/// Default parser backed by `serde_json`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBodyParser;

impl BodyParser for JsonBodyParser {
    fn parse(&self, raw: &[u8]) -> Result<Value, BodyParseError> {
        serde_json::from_slice(raw).map_err(|e| BodyParseError::new(e.to_string()))
    }
}

impl<F> BodyParser for F
where
    F: Fn(&[u8]) -> Result<Value, String> + Send + Sync,
{
    fn parse(&self, raw: &[u8]) -> Result<Value, BodyParseError> {
        self(raw).map_err(BodyParseError::new)
    }
}
