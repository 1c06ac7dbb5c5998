use crate::binder::{Param, Source};
use crate::dispatcher::{Handler, ResponseBindings};
use crate::schema::SchemaDescriptor;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage.
///
/// Names are `Arc<str>` taken from the compiled route (cheap clone); values
/// are per-request strings.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Route registration failure. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The same method and pattern shape are already registered
    DuplicateRoute { method: Method, pattern: String },
    /// Unbalanced braces, empty or repeated capture names, missing leading `/`
    InvalidPattern { pattern: String, reason: String },
    /// A capture has no field in the route's path schema
    UnboundPathParam { pattern: String, param: String },
    /// A required path schema field has no capture in the pattern
    UnknownPathField { pattern: String, field: String },
    /// A schema parameter declared with `Source::File`; files use `Param::file`
    FileSchemaParam { pattern: String, param: String },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::DuplicateRoute { method, pattern } => {
                write!(f, "route {method} {pattern} is already registered")
            }
            RouteError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid path pattern '{pattern}': {reason}")
            }
            RouteError::UnboundPathParam { pattern, param } => {
                write!(
                    f,
                    "path capture '{param}' of '{pattern}' has no field in the path schema"
                )
            }
            RouteError::UnknownPathField { pattern, field } => {
                write!(
                    f,
                    "required path field '{field}' does not appear in pattern '{pattern}'"
                )
            }
            RouteError::FileSchemaParam { pattern, param } => {
                write!(
                    f,
                    "parameter '{param}' of '{pattern}' binds a schema from an uploaded file"
                )
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Declaration of one route, consumed by [`RouteTable::add`].
pub struct RouteDef {
    method: Method,
    pattern: String,
    handler_name: String,
    handler: Arc<dyn Handler>,
    params: Vec<Param>,
    responses: ResponseBindings,
}

impl RouteDef {
    /// Start a route declaration with no parameters or response schemas.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method the route answers
    /// * `pattern` - Path pattern such as `/math/{a}and{b}`; captures may be
    ///   embedded in literal text
    /// * `handler` - Function invoked with the bound parameters
    ///
    /// The handler name defaults to `"<method> <pattern>"`.
    #[must_use]
    pub fn new(method: Method, pattern: &str, handler: impl Handler + 'static) -> Self {
        Self {
            handler_name: format!("{} {pattern}", method.as_str().to_ascii_lowercase()),
            method,
            pattern: pattern.to_string(),
            handler: Arc::new(handler),
            params: Vec::new(),
            responses: ResponseBindings::new(),
        }
    }

    /// Name shown in route listings and logs
    #[must_use]
    pub fn name(mut self, handler_name: &str) -> Self {
        self.handler_name = handler_name.to_string();
        self
    }

    /// Append a parameter; binding follows declaration order
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Declare the response schema for `status`
    #[must_use]
    pub fn response(mut self, status: u16, schema: &Arc<SchemaDescriptor>) -> Self {
        self.responses.insert(status, Arc::clone(schema));
        self
    }

    /// Replace every response schema at once
    #[must_use]
    pub fn responses(mut self, responses: ResponseBindings) -> Self {
        self.responses = responses;
        self
    }
}

/// A compiled, registered route.
pub struct Route {
    pub method: Method,
    pub pattern: Arc<str>,
    pub handler_name: Arc<str>,
    pub handler: Arc<dyn Handler>,
    pub params: Vec<Param>,
    pub responses: ResponseBindings,
    regex: Regex,
    captures: Vec<Arc<str>>,
    /// Pattern with capture names erased, used for duplicate detection
    shape: String,
}

impl Route {
    /// Names of the pattern's captures, in order
    #[must_use]
    pub fn captures(&self) -> &[Arc<str>] {
        &self.captures
    }

    /// Match the raw path and percent-decode each capture.
    ///
    /// Matching runs on the undecoded path, so an encoded `/` (`%2F`) stays
    /// inside its capture. A capture that does not decode to UTF-8 is kept
    /// as sent.
    fn matches(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        Some(
            self.captures
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1).map(|m| {
                        let raw = m.as_str();
                        let value = urlencoding::decode(raw)
                            .map_or_else(|_| raw.to_string(), |v| v.into_owned());
                        (Arc::clone(name), value)
                    })
                })
                .collect(),
        )
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("handler_name", &self.handler_name)
            .field("params", &self.params.iter().map(Param::name).collect::<Vec<_>>())
            .field("responses", &self.responses.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Result of matching a request to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    /// Raw captures, coerced later by the binder
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name ("last write wins")
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Registered routes, immutable once startup completes.
///
/// Routes are tried in registration order; the first whose method and
/// pattern match wins.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method` and `pattern`.
    ///
    /// Shorthand for [`RouteTable::add`] with a [`RouteDef`] named after the
    /// method and pattern.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method the route answers
    /// * `pattern` - Path pattern with `{name}` captures
    /// * `handler` - Function invoked with the bound parameters
    /// * `params` - Parameter declarations, bound in order
    /// * `responses` - Response schemas keyed by status code
    ///
    /// # Errors
    ///
    /// See [`RouteTable::add`].
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl Handler + 'static,
        params: Vec<Param>,
        responses: ResponseBindings,
    ) -> Result<(), RouteError> {
        let mut def = RouteDef::new(method, pattern, handler).responses(responses);
        def.params = params;
        self.add(def)
    }

    /// Compile and register a route declaration.
    ///
    /// # Errors
    ///
    /// - `InvalidPattern` for malformed patterns
    /// - `DuplicateRoute` when the method and pattern shape are taken
    /// - `UnboundPathParam` / `UnknownPathField` when the path schema and the
    ///   pattern captures disagree
    /// - `FileSchemaParam` when a schema parameter names `Source::File`
    pub fn add(&mut self, def: RouteDef) -> Result<(), RouteError> {
        let RouteDef {
            method,
            pattern,
            handler_name,
            handler,
            params,
            responses,
        } = def;

        let (regex, captures, shape) = compile_pattern(&pattern)?;

        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.shape == shape)
        {
            return Err(RouteError::DuplicateRoute { method, pattern });
        }

        check_path_schema(&pattern, &captures, &params)?;
        if let Some(param) = params.iter().find(|p| {
            matches!(p, Param::Schema { source, .. } if *source == Source::File)
        }) {
            return Err(RouteError::FileSchemaParam {
                pattern,
                param: param.name().to_string(),
            });
        }

        info!(
            method = %method,
            pattern = %pattern,
            handler_name = %handler_name,
            params = params.len(),
            responses = ?responses.keys().collect::<Vec<_>>(),
            "Route registered"
        );

        self.routes.push(Arc::new(Route {
            method,
            pattern: Arc::from(pattern.as_str()),
            handler_name: Arc::from(handler_name.as_str()),
            handler,
            params,
            responses,
            regex,
            captures,
            shape,
        }));
        Ok(())
    }

    /// Match a request method and path.
    ///
    /// # Arguments
    ///
    /// * `method` - Request method
    /// * `path` - Request path without the query string
    ///
    /// # Returns
    ///
    /// The first route, in registration order, whose method and pattern
    /// match, together with its percent-decoded captures; `None` otherwise
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        for route in self.routes.iter().filter(|r| r.method == *method) {
            if let Some(path_params) = route.matches(path) {
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %route.handler_name,
                    route_pattern = %route.pattern,
                    path_params = ?path_params,
                    "Route matched"
                );
                return Some(RouteMatch {
                    route: Arc::clone(route),
                    path_params,
                });
            }
        }
        debug!(method = %method, path = %path, "No route matched");
        None
    }

    /// Methods registered for patterns matching `path`, in registration order
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::new();
        for route in &self.routes {
            if !methods.contains(&route.method) && route.regex.is_match(path) {
                methods.push(route.method.clone());
            }
        }
        methods
    }

    /// Registered routes in registration order
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in &self.routes {
            let statuses: Vec<String> = route.responses.keys().map(u16::to_string).collect();
            println!(
                "[route] {} {} -> {} responses=[{}]",
                route.method,
                route.pattern,
                route.handler_name,
                statuses.join(",")
            );
        }
    }
}

/// Compile a path pattern into an anchored regex.
///
/// Captures may share a segment with literal text (`/math/{a}and{b}`); each
/// capture matches a non-empty run without `/`, lazily so that the following
/// literal text can match.
///
/// Returns the regex, capture names in order, and the pattern shape (captures
/// rendered as `{}`).
pub(crate) fn compile_pattern(pattern: &str) -> Result<(Regex, Vec<Arc<str>>, String), RouteError> {
    let invalid = |reason: &str| RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };
    if !pattern.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    let mut regex = String::with_capacity(pattern.len() + 16);
    regex.push('^');
    let mut shape = String::with_capacity(pattern.len());
    let mut captures: Vec<Arc<str>> = Vec::new();
    let mut rest = pattern;

    while let Some(open) = rest.find(['{', '}']) {
        if rest.as_bytes()[open] == b'}' {
            return Err(invalid("unmatched '}'"));
        }
        let literal = &rest[..open];
        regex.push_str(&regex::escape(literal));
        shape.push_str(literal);

        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
        let name = &after[..close];
        if name.is_empty() {
            return Err(invalid("empty capture name"));
        }
        if name.contains(['{', '/']) {
            return Err(invalid("nested '{' or '/' in capture"));
        }
        if captures.iter().any(|c| c.as_ref() == name) {
            return Err(invalid(&format!("capture '{name}' repeated")));
        }
        captures.push(Arc::from(name));
        regex.push_str("([^/]+?)");
        shape.push_str("{}");
        rest = &after[close + 1..];
    }
    regex.push_str(&regex::escape(rest));
    shape.push_str(rest);
    regex.push('$');

    let regex = Regex::new(&regex).map_err(|e| invalid(&e.to_string()))?;
    Ok((regex, captures, shape))
}

/// Captures and path schema fields must line up.
fn check_path_schema(
    pattern: &str,
    captures: &[Arc<str>],
    params: &[Param],
) -> Result<(), RouteError> {
    let path_schemas: Vec<&Arc<SchemaDescriptor>> = params
        .iter()
        .filter_map(|p| match p {
            Param::Schema {
                source: Source::Path,
                schema,
                ..
            } => Some(schema),
            _ => None,
        })
        .collect();

    for capture in captures {
        if !path_schemas
            .iter()
            .any(|s| s.field_by_external(capture).is_some())
        {
            return Err(RouteError::UnboundPathParam {
                pattern: pattern.to_string(),
                param: capture.to_string(),
            });
        }
    }
    for schema in path_schemas {
        if let Some(field) = schema
            .fields()
            .iter()
            .find(|f| f.is_required() && !captures.iter().any(|c| c.as_ref() == f.external_name()))
        {
            return Err(RouteError::UnknownPathField {
                pattern: pattern.to_string(),
                field: field.name().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_embedded_captures() {
        let (re, caps, shape) = compile_pattern("/math/{a}and{b}").unwrap();
        assert_eq!(caps.len(), 2);
        assert_eq!(shape, "/math/{}and{}");
        let m = re.captures("/math/3and4").unwrap();
        assert_eq!(&m[1], "3");
        assert_eq!(&m[2], "4");
        assert!(!re.is_match("/math/and4"));
        assert!(!re.is_match("/math/3and"));
        assert!(!re.is_match("/math/3/and4"));
    }

    #[test]
    fn test_compile_escapes_literals() {
        let (re, caps, _) = compile_pattern("/files/{name}.txt").unwrap();
        assert_eq!(caps[0].as_ref(), "name");
        assert!(re.is_match("/files/a.txt"));
        assert!(!re.is_match("/files/aXtxt"));
    }

    #[test]
    fn test_compile_rejects_bad_patterns() {
        for bad in ["no-slash", "/a/{b", "/a/b}", "/a/{}", "/a/{x}/{x}"] {
            assert!(
                matches!(compile_pattern(bad), Err(RouteError::InvalidPattern { .. })),
                "{bad}"
            );
        }
    }
}
