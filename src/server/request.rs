use crate::binder::RequestContext;
use crate::ids::RequestId;
use http::Method;
use may_minihttp::Request;
use std::io::{self, Read};
use tracing::debug;

/// Convert a `may_minihttp::Request` into a [`RequestContext`].
///
/// At most `max_body_bytes + 1` body bytes are read, so an oversized body is
/// detectable without buffering all of it. The request id is taken from a
/// valid `X-Request-Id` header or generated.
///
/// # Errors
///
/// `InvalidInput` when the method token is not a valid HTTP method; read
/// errors of the body stream are passed through.
pub fn parse_request(req: Request, max_body_bytes: usize) -> io::Result<RequestContext> {
    let method = Method::from_bytes(req.method().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut ctx = RequestContext::new(method, req.path());

    for h in req.headers() {
        ctx.insert_header(h.name, String::from_utf8_lossy(h.value).into_owned());
    }
    ctx.request_id = RequestId::from_header_or_new(ctx.get_header("x-request-id"));

    let limit = u64::try_from(max_body_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut body = Vec::new();
    req.body().take(limit).read_to_end(&mut body)?;
    ctx.body = body;

    debug!(
        request_id = %ctx.request_id,
        method = %ctx.method,
        path = %ctx.path,
        header_count = ctx.headers.len(),
        query_count = ctx.query_params.len(),
        body_size_bytes = ctx.body.len(),
        content_type = ctx.content_type().unwrap_or(""),
        "HTTP request parsed"
    );
    Ok(ctx)
}
