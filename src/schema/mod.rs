//! # Schema Module
//!
//! Declarative schemas used both to validate requests and to shape responses.
//!
//! ## Overview
//!
//! A schema is a named, ordered set of fields. Each [`Field`] has an internal
//! name, a [`FieldType`], an optional default (no default means required) and
//! an optional alias used at the request/response boundary.
//!
//! Schemas are declared with [`SchemaBuilder`] and are immutable once built:
//!
//! - **Inheritance** - `extends(&parent)` merges the parent's fields with the
//!   schema's own, the child winning on name collisions
//! - **Alias generation** - an [`AliasGenerator`] such as [`alias::to_camel`]
//!   precomputes the external name of every field without an explicit alias
//! - **Default checking** - defaults are coerced to their declared type at
//!   build time, so a misconfigured schema fails at startup
//!
//! Binding a request against a schema yields an [`Instance`].
//!
//! ## Example
//!
//! ```rust
//! use brrtbind::schema::{alias, Field, FieldType, SchemaRegistry, SchemaDescriptor};
//!
//! let mut registry = SchemaRegistry::new();
//! let camel = registry
//!     .define(
//!         SchemaDescriptor::builder("CamelModelSchema")
//!             .field(Field::new("str_field_name", FieldType::Str))
//!             .field(Field::new("float_field_name", FieldType::Float))
//!             .alias_generator(alias::to_camel),
//!     )
//!     .unwrap();
//! assert_eq!(camel.fields()[0].external_name(), "StrFieldName");
//! ```

pub mod alias;
mod coerce;
mod core;
mod error;
mod types;

pub use coerce::{coerce_json, coerce_many, coerce_str, CoercionError};
pub use core::{AliasGenerator, Instance, SchemaBuilder, SchemaDescriptor, SchemaRegistry};
pub use error::{InstanceError, SchemaDefinitionError};
pub use types::{Field, FieldType};
