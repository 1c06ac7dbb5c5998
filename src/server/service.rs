use super::request::parse_request;
use super::response::write_envelope;
use crate::binder::{Binder, BodyParser, JsonBodyParser, MultipartConfig, RequestContext};
use crate::config::AppConfig;
use crate::dispatcher::{dispatch_reply, ResponseEnvelope};
use crate::router::RouteTable;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn};

/// Default request body limit (50 MB), matching the multipart total limit
pub const DEFAULT_MAX_BODY_BYTES: usize = crate::binder::multipart::DEFAULT_MAX_TOTAL_SIZE;

/// API entry point: route table plus body parser.
///
/// Cheap to clone; the transport clones one per connection. Everything it
/// holds is immutable after startup.
#[derive(Clone)]
pub struct AppService {
    routes: Arc<RouteTable>,
    parser: Arc<dyn BodyParser>,
    multipart: MultipartConfig,
    max_body_bytes: usize,
}

impl AppService {
    /// Service over `routes` with the JSON body parser and default limits.
    ///
    /// # Arguments
    ///
    /// * `routes` - Route table built at startup
    #[must_use]
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self {
            routes,
            parser: Arc::new(JsonBodyParser),
            multipart: MultipartConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Service with the limits of a loaded [`AppConfig`]
    ///
    /// # Arguments
    ///
    /// * `routes` - Route table built at startup
    /// * `config` - Supplies `http.max_body_bytes` and the multipart limits
    #[must_use]
    pub fn from_config(routes: Arc<RouteTable>, config: &AppConfig) -> Self {
        Self::new(routes).with_limits(config.http.max_body_bytes, config.multipart)
    }

    /// Replace the body parser used for body parameters
    #[must_use]
    pub fn with_parser(mut self, parser: impl BodyParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Override the request body cap and multipart limits
    #[must_use]
    pub fn with_limits(mut self, max_body_bytes: usize, multipart: MultipartConfig) -> Self {
        self.max_body_bytes = max_body_bytes;
        self.multipart = multipart;
        self
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Run one request through `match → bind → invoke → dispatch`.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Request method, target, headers and body
    ///
    /// # Returns
    ///
    /// The envelope to write: the handler's shaped reply, or 404/405 for
    /// unmatched requests, 413 for oversized bodies, 422 for binding errors
    /// and 500 for handler or response shaping failures. This never fails.
    pub fn handle(&self, mut ctx: RequestContext) -> ResponseEnvelope {
        let span = info_span!(
            "request",
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path
        );
        let _enter = span.enter();
        let start = Instant::now();

        let envelope = self.process(&mut ctx);

        info!(
            status = envelope.status,
            duration_us = start.elapsed().as_micros() as u64,
            "Request completed"
        );
        envelope
    }

    fn process(&self, ctx: &mut RequestContext) -> ResponseEnvelope {
        if ctx.body.len() > self.max_body_bytes {
            warn!(
                body_size_bytes = ctx.body.len(),
                limit = self.max_body_bytes,
                "Request body too large"
            );
            return ResponseEnvelope::json(
                413,
                json!({"error": "Payload Too Large", "limit": self.max_body_bytes}),
            );
        }

        let Some(matched) = self.routes.route(&ctx.method, &ctx.path) else {
            let allowed = self.routes.allowed_methods(&ctx.path);
            if allowed.is_empty() {
                warn!("No route matched");
                return ResponseEnvelope::json(
                    404,
                    json!({"error": "Not Found", "method": ctx.method.as_str(), "path": ctx.path}),
                );
            }
            let allowed: Vec<&str> = allowed.iter().map(http::Method::as_str).collect();
            warn!(allowed = ?allowed, "Method not allowed");
            return ResponseEnvelope::json(
                405,
                json!({
                    "error": "Method Not Allowed",
                    "method": ctx.method.as_str(),
                    "path": ctx.path,
                    "allowed": allowed
                }),
            );
        };
        let route = matched.route;
        ctx.path_params = matched.path_params;

        let binder = Binder::with_parser(ctx, self.parser.as_ref(), self.multipart);
        let bound = match binder.bind_all(&route.params) {
            Ok(bound) => bound,
            Err(err) => {
                warn!(
                    handler_name = %route.handler_name,
                    error = %err,
                    "Request binding failed"
                );
                return ResponseEnvelope::json(
                    err.status(),
                    json!({"error": err.title(), "detail": err.errors()}),
                );
            }
        };

        let reply = match route.handler.call(&bound) {
            Ok(reply) => reply,
            Err(err) => {
                error!(
                    handler_name = %route.handler_name,
                    error = format!("{err:#}"),
                    "Handler failed"
                );
                return ResponseEnvelope::json(
                    500,
                    json!({"error": "Handler failed", "handler": route.handler_name.as_ref()}),
                );
            }
        };

        match dispatch_reply(&route.responses, reply) {
            Ok(envelope) => envelope,
            Err(err) => {
                error!(
                    handler_name = %route.handler_name,
                    error = %err,
                    "Response validation failed"
                );
                ResponseEnvelope::json(
                    500,
                    json!({"error": "Response validation failed", "detail": err.errors}),
                )
            }
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let envelope = match parse_request(req, self.max_body_bytes) {
            Ok(ctx) => self.handle(ctx),
            Err(err) => {
                warn!(error = %err, "Malformed request");
                ResponseEnvelope::error(400, "Bad Request")
            }
        };
        write_envelope(res, &envelope);
        Ok(())
    }
}
