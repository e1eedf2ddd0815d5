use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Query parameter storage, kept inline for the common handful of pairs.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    pub path_pattern: String,
    pub handler_name: String,
}

impl RouteMeta {
    pub fn new(method: Method, path_pattern: impl Into<String>, handler_name: impl Into<String>) -> Self {
        Self {
            method,
            path_pattern: path_pattern.into(),
            handler_name: handler_name.into(),
        }
    }
}

/// Result of matching a request to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteMeta>,
    pub handler_name: String,
    /// Query string parameters, populated by the server after matching.
    pub query_params: ParamVec,
}

struct CompiledRoute {
    regex: Regex,
    meta: Arc<RouteMeta>,
}

/// Router matching HTTP requests to handler names.
#[derive(Clone)]
pub struct Router {
    routes: Arc<Vec<CompiledRoute>>,
}

impl Router {
    /// Compile `routes`, longest pattern first.
    pub fn new(routes: Vec<RouteMeta>) -> Result<Self, regex::Error> {
        let mut routes = routes;
        routes.sort_by(|a, b| b.path_pattern.len().cmp(&a.path_pattern.len()));

        let compiled = routes
            .into_iter()
            .map(|meta| {
                Ok(CompiledRoute {
                    regex: Self::path_to_regex(&meta.path_pattern)?,
                    meta: Arc::new(meta),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        info!(routes_count = compiled.len(), "Routing table loaded");
        Ok(Self {
            routes: Arc::new(compiled),
        })
    }

    /// Find the route for `method` and `path` (query string already stripped).
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let hit = self
            .routes
            .iter()
            .find(|r| r.meta.method == *method && r.regex.is_match(path));

        let Some(route) = hit else {
            debug!(method = %method, path = %path, "No route matched");
            return None;
        };

        Some(RouteMatch {
            route: Arc::clone(&route.meta),
            handler_name: route.meta.handler_name.clone(),
            query_params: ParamVec::new(),
        })
    }

    /// Route table in match order, for listing.
    pub fn routes(&self) -> impl Iterator<Item = &RouteMeta> {
        self.routes.iter().map(|r| r.meta.as_ref())
    }

    /// Anchored regex for a literal path, tolerating one trailing slash and
    /// collapsing repeated separators in the pattern.
    pub(crate) fn path_to_regex(path: &str) -> Result<Regex, regex::Error> {
        if path == "/" {
            return Regex::new(r"^/$");
        }

        let mut pattern = String::with_capacity(path.len() + 8);
        pattern.push('^');
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            pattern.push('/');
            pattern.push_str(&regex::escape(segment));
        }
        pattern.push_str("/?$");
        Regex::new(&pattern)
    }
}
