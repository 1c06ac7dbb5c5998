use crate::dispatcher::{ResponseEnvelope, JSON_CONTENT_TYPE};
use may_minihttp::Response;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Header line for [`JSON_CONTENT_TYPE`], the only content type envelopes carry
const JSON_CONTENT_TYPE_HEADER: &str = "Content-Type: application/json";

/// Write an envelope as status line, `Content-Type` and body.
///
/// # Arguments
///
/// * `res` - Transport response to fill
/// * `envelope` - Status and JSON body produced by the service
pub fn write_envelope(res: &mut Response, envelope: &ResponseEnvelope) {
    debug_assert_eq!(envelope.content_type, JSON_CONTENT_TYPE);
    res.status_code(envelope.status as usize, status_reason(envelope.status));
    res.header(JSON_CONTENT_TYPE_HEADER);
    res.body_vec(envelope.body_bytes());
}
