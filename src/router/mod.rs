//! # Router Module
//!
//! The route table associates an HTTP method and a path pattern with a handler
//! and its parameter and response-schema bindings.
//!
//! ## Patterns
//!
//! Patterns are literal text with named captures in braces. A capture may
//! share a segment with literal text:
//!
//! - `/filter/{item_id}` captures one whole segment
//! - `/math/{a}and{b}` captures `3` and `4` from `/math/3and4`
//!
//! Each pattern is compiled once, at registration, into an anchored regex.
//! Captures match a non-empty run of characters without `/`; the router does
//! not coerce them. Typed coercion happens in the binder, so `/math/xandy`
//! matches here and is rejected there with a 422.
//!
//! ## Registration
//!
//! ```rust
//! use brrtbind::binder::{Bound, Param};
//! use brrtbind::dispatcher::Reply;
//! use brrtbind::router::{RouteDef, RouteTable};
//! use brrtbind::schema::{Field, FieldType, SchemaDescriptor};
//! use http::Method;
//!
//! fn get_item(bound: &Bound) -> anyhow::Result<Reply> {
//!     Ok(bound.require("path")?.to_value().into())
//! }
//!
//! let path = SchemaDescriptor::builder("ItemPath")
//!     .field(Field::new("item_id", FieldType::Int))
//!     .build()
//!     .unwrap();
//! let mut table = RouteTable::new();
//! table
//!     .add(RouteDef::new(Method::GET, "/items/{item_id}", get_item).param(Param::path("path", &path)))
//!     .unwrap();
//! let m = table.route(&Method::GET, "/items/7").unwrap();
//! assert_eq!(m.get_path_param("item_id"), Some("7"));
//! ```
//!
//! Registering the same method and pattern twice (capture names aside) fails
//! with [`RouteError::DuplicateRoute`]. A path that matches only under other
//! methods is reported by [`RouteTable::allowed_methods`] so the service can
//! answer 405 instead of 404.

mod core;

pub use core::{ParamVec, Route, RouteDef, RouteError, RouteMatch, RouteTable, MAX_INLINE_PARAMS};
