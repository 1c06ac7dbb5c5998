//! # Server Module
//!
//! Thin adapter between the `may_minihttp` transport and [`AppService`].
//!
//! - [`request`] converts a transport request into a
//!   [`RequestContext`](crate::binder::RequestContext)
//! - [`service`] runs the per-request pipeline and maps failures to status
//!   codes (404, 405, 413, 422, 500)
//! - [`response`] writes the resulting envelope back
//! - [`http_server`] starts and stops the listener
//!
//! The service itself is transport-independent: [`AppService::handle`] takes a
//! `RequestContext` and returns a
//! [`ResponseEnvelope`](crate::dispatcher::ResponseEnvelope), which is how the
//! integration tests drive it.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use response::write_envelope;
pub use service::{AppService, DEFAULT_MAX_BODY_BYTES};
