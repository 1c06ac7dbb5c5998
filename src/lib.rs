//! # brrtbind
//!
//! **brrtbind** is a schema-validated HTTP API layer for the `may` coroutine
//! runtime. Handlers never see raw requests: path captures, query pairs,
//! headers, form fields, JSON bodies and uploaded files are coerced into typed
//! schema instances first, and handler return values are shaped by the
//! response schema declared for their status code.
//!
//! ## Architecture
//!
//! - **[`schema`]** - Declarative schemas: typed fields, defaults, aliases,
//!   inheritance
//! - **[`binder`]** - Request context and parameter binding per location
//! - **[`router`]** - Route table with compiled path patterns
//! - **[`dispatcher`]** - Handler trait, replies and response shaping
//! - **[`server`]** - `AppService` pipeline and the `may_minihttp` adapter
//! - **[`handlers`]** / **[`registry`]** - The demo API
//! - **[`config`]**, **[`runtime_config`]**, **[`logging`]**, **[`ids`]** -
//!   Configuration, coroutine tuning, structured logs, request ids
//! - **[`cli`]** - `serve` and `routes` commands
//!
//! ## Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant T as may_minihttp
//!     participant S as AppService
//!     participant R as RouteTable
//!     participant B as Binder
//!     participant H as Handler
//!     participant D as dispatcher
//!
//!     T->>S: Request
//!     S->>R: route(method, path)
//!     R-->>S: RouteMatch (or 404 / 405)
//!     S->>B: bind_all(params)
//!     B-->>S: Bound (or 422)
//!     S->>H: call(&Bound)
//!     H-->>S: Reply (or 500)
//!     S->>D: dispatch_reply(responses, reply)
//!     D-->>S: ResponseEnvelope (or 500)
//!     S->>T: status, Content-Type, body
//! ```
//!
//! ## Example
//!
//! ```rust
//! use brrtbind::binder::{Bound, Param, RequestContext};
//! use brrtbind::dispatcher::Reply;
//! use brrtbind::router::{RouteDef, RouteTable};
//! use brrtbind::schema::{Field, FieldType, SchemaDescriptor};
//! use brrtbind::server::AppService;
//! use http::Method;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! fn math(bound: &Bound) -> anyhow::Result<Reply> {
//!     let path = bound.require("path")?;
//!     let (a, b) = (path.require_i64("a")?, path.require_i64("b")?);
//!     Ok(json!({ "a+b": a + b }).into())
//! }
//!
//! let operands = SchemaDescriptor::builder("Operands")
//!     .field(Field::new("a", FieldType::Int))
//!     .field(Field::new("b", FieldType::Int))
//!     .build()
//!     .unwrap();
//! let mut table = RouteTable::new();
//! table
//!     .add(RouteDef::new(Method::GET, "/math/{a}and{b}", math).param(Param::path("path", &operands)))
//!     .unwrap();
//!
//! let service = AppService::new(Arc::new(table));
//! let ok = service.handle(RequestContext::new(Method::GET, "/math/3and4"));
//! assert_eq!(ok.body, json!({ "a+b": 7 }));
//! let bad = service.handle(RequestContext::new(Method::GET, "/math/xandy"));
//! assert_eq!(bad.status, 422);
//! ```

pub mod binder;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod schema;
pub mod server;

pub use binder::{BindingError, Bound, Param, RequestContext, Source};
pub use dispatcher::{Handler, Reply, ResponseEnvelope};
pub use router::{RouteDef, RouteError, RouteTable};
pub use schema::{Field, FieldType, Instance, SchemaDescriptor, SchemaRegistry};
pub use server::AppService;
