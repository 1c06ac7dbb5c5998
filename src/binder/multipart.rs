//! `multipart/form-data` decoding for form fields and uploaded files.
//!
//! The body is already buffered by the transport, so parts are sliced out of
//! it in one pass. Size and count limits come from [`MultipartConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

/// Default maximum size of one uploaded file (10 MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum size of all parts together (50 MB)
pub const DEFAULT_MAX_TOTAL_SIZE: usize = 50 * 1024 * 1024;

/// Default maximum number of parts
pub const DEFAULT_MAX_FIELDS: usize = 100;

/// Limits applied while decoding a multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultipartConfig {
    pub max_file_size: usize,
    pub max_total_size: usize,
    pub max_fields: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

/// Multipart decoding failure; surfaces to clients as a body parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartError {
    /// No `boundary=` parameter in the content type
    MissingBoundary,
    /// A part lacks `Content-Disposition` or its `name`
    InvalidContentDisposition { detail: String },
    /// Structure does not follow RFC 7578
    InvalidFormat { detail: &'static str },
    /// Body ended before the closing delimiter
    UnexpectedEof,
    FileTooLarge { size: usize, max: usize },
    TotalTooLarge { size: usize, max: usize },
    TooManyFields { max: usize },
}

impl fmt::Display for MultipartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultipartError::MissingBoundary => write!(f, "missing boundary in multipart Content-Type"),
            MultipartError::InvalidContentDisposition { detail } => {
                write!(f, "invalid Content-Disposition: {detail}")
            }
            MultipartError::InvalidFormat { detail } => write!(f, "invalid multipart body: {detail}"),
            MultipartError::UnexpectedEof => write!(f, "unexpected end of multipart body"),
            MultipartError::FileTooLarge { size, max } => {
                write!(f, "file of {size} bytes exceeds limit of {max}")
            }
            MultipartError::TotalTooLarge { size, max } => {
                write!(f, "multipart body of {size} bytes exceeds limit of {max}")
            }
            MultipartError::TooManyFields { max } => write!(f, "more than {max} parts"),
        }
    }
}

impl std::error::Error for MultipartError {}

/// One decoded part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// An uploaded file bound from a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    field_name: String,
    name: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

impl UploadedFile {
    #[must_use]
    pub fn new(field_name: &str, name: &str, content_type: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            field_name: field_name.to_string(),
            name: name.to_string(),
            content_type: content_type.map(str::to_string),
            data,
        }
    }

    /// Client-side file name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Form field the file was sent under
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Byte stream over the file contents
    #[must_use]
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.data)
    }
}

impl From<Part> for UploadedFile {
    fn from(part: Part) -> Self {
        Self {
            field_name: part.name,
            name: part.filename.unwrap_or_default(),
            content_type: part.content_type,
            data: part.data,
        }
    }
}

/// Extract the boundary from `multipart/form-data; boundary=...`.
pub fn parse_boundary(content_type: &str) -> Result<String, MultipartError> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
        .filter(|b| !b.is_empty())
        .ok_or(MultipartError::MissingBoundary)
}

/// Decode a buffered multipart body into parts, in body order.
pub fn parse_multipart(
    body: &[u8],
    boundary: &str,
    config: &MultipartConfig,
) -> Result<Vec<Part>, MultipartError> {
    let delimiter = format!("--{boundary}").into_bytes();
    let part_end = format!("\r\n--{boundary}").into_bytes();

    let mut pos = find(body, &delimiter, 0).ok_or(MultipartError::UnexpectedEof)?;
    let mut parts = Vec::new();
    let mut total = 0usize;

    loop {
        let after = pos + delimiter.len();
        let rest = body.get(after..).ok_or(MultipartError::UnexpectedEof)?;
        if rest.starts_with(b"--") {
            break;
        }
        if !rest.starts_with(b"\r\n") {
            return Err(MultipartError::InvalidFormat {
                detail: "expected CRLF after boundary",
            });
        }
        if parts.len() >= config.max_fields {
            return Err(MultipartError::TooManyFields {
                max: config.max_fields,
            });
        }

        let (headers, data_start) = read_part_headers(body, after + 2)?;
        let data_end = find(body, &part_end, data_start).ok_or(MultipartError::UnexpectedEof)?;
        let data = &body[data_start..data_end];

        let disposition = headers
            .iter()
            .find(|(k, _)| k == "content-disposition")
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| MultipartError::InvalidContentDisposition {
                detail: "missing header".to_string(),
            })?;
        let (name, filename) = parse_content_disposition(disposition)?;

        if filename.is_some() && data.len() > config.max_file_size {
            return Err(MultipartError::FileTooLarge {
                size: data.len(),
                max: config.max_file_size,
            });
        }
        total += data.len();
        if total > config.max_total_size {
            return Err(MultipartError::TotalTooLarge {
                size: total,
                max: config.max_total_size,
            });
        }

        let content_type = headers
            .into_iter()
            .find(|(k, _)| k == "content-type")
            .map(|(_, v)| v);
        parts.push(Part {
            name,
            filename,
            content_type,
            data: data.to_vec(),
        });

        // Skip the CRLF that belongs to the delimiter line.
        pos = data_end + 2;
    }

    Ok(parts)
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Read `name: value` lines up to the blank line; returns headers with
/// lower-cased names and the offset of the part data.
fn read_part_headers(
    body: &[u8],
    mut pos: usize,
) -> Result<(Vec<(String, String)>, usize), MultipartError> {
    let mut headers = Vec::new();
    loop {
        let line_end = find(body, b"\r\n", pos).ok_or(MultipartError::UnexpectedEof)?;
        let line = &body[pos..line_end];
        pos = line_end + 2;
        if line.is_empty() {
            return Ok((headers, pos));
        }
        let line = std::str::from_utf8(line).map_err(|_| MultipartError::InvalidFormat {
            detail: "part header is not UTF-8",
        })?;
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }
}

/// Split header parameters on `;`, ignoring separators inside quoted values.
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&value[start..]);
    params
}

/// Strip one pair of surrounding quotes and undo `\"` / `\\` escapes.
fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Reject names that would escape an upload directory.
///
/// Dots inside a name (`cv..v2.pdf`) are fine; a `..` path component,
/// any separator and NUL are not.
fn check_filename(name: &str) -> Result<(), MultipartError> {
    let detail = if name.split(['/', '\\']).any(|c| c == "..") {
        "filename contains a parent directory component"
    } else if name.contains(['/', '\\']) {
        "filename contains path separators"
    } else if name.contains('\0') {
        "filename contains NUL"
    } else {
        return Ok(());
    };
    Err(MultipartError::InvalidContentDisposition {
        detail: detail.to_string(),
    })
}

/// `form-data; name="details"; filename="a.txt"` → (`details`, `Some("a.txt")`)
fn parse_content_disposition(value: &str) -> Result<(String, Option<String>), MultipartError> {
    let mut name = None;
    let mut filename = None;
    for param in split_params(value).into_iter().skip(1) {
        let Some((key, raw)) = param.trim().split_once('=') else {
            continue;
        };
        let unquoted = unquote(raw);
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => name = Some(unquoted),
            "filename" => {
                check_filename(&unquoted)?;
                filename = Some(unquoted);
            }
            _ => {}
        }
    }
    let name = name.ok_or_else(|| MultipartError::InvalidContentDisposition {
        detail: "missing name parameter".to_string(),
    })?;
    Ok((name, filename))
}
