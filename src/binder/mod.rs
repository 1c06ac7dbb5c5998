//! # Binder Module
//!
//! The binder turns the raw inputs of a request into validated schema
//! instances before a handler runs.
//!
//! ## Overview
//!
//! Every route declares its parameters as [`Param`]s. Each schema parameter
//! names a request location ([`Source`]) and a schema; each field of the
//! schema is read from that location under its external name (alias if
//! declared) and coerced to its declared type:
//!
//! - **path**: named captures of the matched pattern
//! - **query**: decoded query pairs; list fields take every repeated key
//! - **header**: case-insensitive header lookup
//! - **form**: urlencoded fields or multipart text parts, bound like query
//! - **body**: the request body decoded by the pluggable [`BodyParser`]
//! - **file**: a multipart part carrying a filename, as an [`UploadedFile`]
//!
//! Parameters bind in stage order (path, query/header, form/body, file). The
//! first failing parameter short-circuits with a [`BindingError`]; all field
//! errors of that parameter's schema are reported together.
//!
//! ## Example
//!
//! ```rust
//! use brrtbind::binder::{bind, RequestContext, Source};
//! use brrtbind::schema::{Field, FieldType, SchemaDescriptor};
//! use http::Method;
//!
//! let schema = SchemaDescriptor::builder("Hello")
//!     .field(Field::new("name", FieldType::Str).optional())
//!     .build()
//!     .unwrap();
//! let ctx = RequestContext::new(Method::GET, "/hello?name=Ann");
//! let inst = bind(&schema, &ctx, Source::Query).unwrap();
//! assert_eq!(inst.get_str("name"), Some("Ann"));
//! ```

mod context;
mod core;
mod error;
mod form;
pub mod multipart;
mod parser;

pub use context::{parse_query, HeaderVec, RequestContext, MAX_INLINE_HEADERS};
pub use core::{bind, Binder, Bound, Param, Source};
pub use error::{BindingError, FieldError};
pub use form::FormData;
pub use multipart::{MultipartConfig, MultipartError, UploadedFile};
pub use parser::{BodyParseError, BodyParser, JsonBodyParser};
