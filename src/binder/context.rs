use crate::ids::RequestId;
use crate::router::ParamVec;
use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage; names are lower-cased on insert.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Raw inputs of a single request.
///
/// Built by the transport adapter (or directly in tests) and owned by the
/// request lifecycle. Path parameters are filled in by the router after a
/// successful match; form fields and uploaded files are decoded from `body`
/// by the binder on demand.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Correlation id for logs
    pub request_id: RequestId,
    /// HTTP method
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Captures from the matched path pattern
    pub path_params: ParamVec,
    /// Decoded query pairs in order, repeats kept
    pub query_params: ParamVec,
    /// Headers with lower-cased names
    pub headers: HeaderVec,
    /// Raw body bytes, already buffered by the transport
    pub body: Vec<u8>,
}

impl RequestContext {
    /// Create a context from a method and a request target (`/path?query`).
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, q),
            None => (target, ""),
        };
        let path = if path.is_empty() { "/" } else { path };
        Self {
            request_id: RequestId::new(),
            method,
            path: path.to_string(),
            path_params: ParamVec::new(),
            query_params: parse_query(query),
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.insert_header(name, value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and its content type.
    #[must_use]
    pub fn with_json(self, body: &serde_json::Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    /// Set an `application/x-www-form-urlencoded` body from pairs.
    #[must_use]
    pub fn with_form(self, pairs: &[(&str, &str)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.with_header("content-type", "application/x-www-form-urlencoded")
            .with_body(body)
    }

    /// Add a header, replacing none; repeated names are kept.
    pub fn insert_header(&mut self, name: &str, value: String) {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase().as_str()), value));
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("content-type")
    }

    /// Whether the body is `multipart/form-data`
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("multipart/form-data"))
    }

    /// Get a path parameter by name ("last write wins")
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a repeated query key, in request order
    pub fn query_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query_params
            .iter()
            .filter(move |(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Decode a query string into ordered pairs, keeping repeated keys.
#[must_use]
pub fn parse_query(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_target() {
        let ctx = RequestContext::new(Method::GET, "/filter/1?categories=a&categories=b&limit=5");
        assert_eq!(ctx.path, "/filter/1");
        let cats: Vec<&str> = ctx.query_values("categories").collect();
        assert_eq!(cats, vec!["a", "b"]);
        assert_eq!(ctx.query_values("limit").next(), Some("5"));
    }

    #[test]
    fn test_query_decoding() {
        let ctx = RequestContext::new(Method::GET, "/hello?name=Ann%20Lee&x=a+b");
        assert_eq!(ctx.query_values("name").next(), Some("Ann Lee"));
        assert_eq!(ctx.query_values("x").next(), Some("a b"));
    }

    #[test]
    fn test_headers_case_insensitive() {
        let ctx = RequestContext::new(Method::POST, "/test").with_header("X-Custom", "v");
        assert_eq!(ctx.get_header("x-custom"), Some("v"));
        assert_eq!(ctx.get_header("X-CUSTOM"), Some("v"));
    }

    #[test]
    fn test_is_multipart() {
        let ctx = RequestContext::new(Method::POST, "/u")
            .with_header("Content-Type", "multipart/form-data; boundary=abc");
        assert!(ctx.is_multipart());
        assert!(!RequestContext::new(Method::POST, "/u").is_multipart());
    }
}
