use serde_json::Value;

/// Body parser of the demo service: JSON, tolerating a leading UTF-8 byte
/// order mark and surrounding whitespace.
pub fn lenient_json(raw: &[u8]) -> Result<Value, String> {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    serde_json::from_slice(raw.trim_ascii()).map_err(|e| e.to_string())
}
