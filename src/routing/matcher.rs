//! Request context and route constraints.
//!
//! # Responsibilities
//! - Carry the request metadata a constraint may inspect (URI, headers, root)
//! - Define the constraint trait evaluated during matching and generation
//! - Hold a route's constraints as an ordered, named set
//!
//! # Design Decisions
//! - Constraint names are looked up case-insensitively
//! - Every constraint must pass (AND semantics), evaluated in insertion order
//! - Concrete constraints are recovered by downcast; a wrong type is `None`

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, Request, Uri};

use crate::routing::encoding::decode_path;
use crate::routing::types::{RouteDirection, RouteValues};

/// What a route sees of an incoming request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    uri: Uri,
    headers: HeaderMap,
    virtual_path_root: String,
}

impl RequestContext {
    /// Create a context for `uri` served under `virtual_path_root`.
    pub fn new(uri: Uri, virtual_path_root: impl Into<String>) -> Self {
        Self {
            uri,
            headers: HeaderMap::new(),
            virtual_path_root: normalize_root(&virtual_path_root.into()),
        }
    }

    /// Capture URI and headers from an HTTP request.
    pub fn from_request<B>(req: &Request<B>, virtual_path_root: impl Into<String>) -> Self {
        Self::new(req.uri().clone(), virtual_path_root).with_headers(req.headers().clone())
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Always starts with `/` and never ends with one, except for the bare root.
    pub fn virtual_path_root(&self) -> &str {
        &self.virtual_path_root
    }

    /// The decoded request path relative to the virtual-path root, without a
    /// leading `/`. `None` when the request lies outside the root.
    pub fn path_within_root(&self) -> Option<String> {
        let path = self.uri.path();
        let rest = if self.virtual_path_root == "/" {
            path
        } else {
            let root = &self.virtual_path_root;
            let head = path.get(..root.len())?;
            if !head.eq_ignore_ascii_case(root) {
                return None;
            }
            let rest = &path[root.len()..];
            if !rest.is_empty() && !rest.starts_with('/') {
                return None;
            }
            rest
        };
        Some(decode_path(rest.trim_start_matches('/')).into_owned())
    }
}

/// Normalize a virtual-path root to `/` or `/segment[/segment]`.
pub fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// A predicate attached to a route.
pub trait RouteConstraint: Send + Sync + fmt::Debug {
    /// Returns true if the route may match or generate for these inputs.
    fn matches(&self, request: &RequestContext, values: &RouteValues, direction: RouteDirection) -> bool;

    /// Gives callers access to the concrete constraint type.
    fn as_any(&self) -> &dyn Any;
}

/// Ordered mapping from constraint name to constraint.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    entries: Vec<(String, Arc<dyn RouteConstraint>)>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the constraint stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, constraint: impl RouteConstraint + 'static) {
        self.insert_arc(name, Arc::new(constraint));
    }

    pub fn insert_arc(&mut self, name: impl Into<String>, constraint: Arc<dyn RouteConstraint>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = constraint,
            None => self.entries.push((name, constraint)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn RouteConstraint> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, c)| c.as_ref())
    }

    /// Downcast the constraint under `name` to `T`.
    pub fn get_as<T: 'static>(&self, name: &str) -> Option<&T> {
        self.get(name).and_then(|c| c.as_any().downcast_ref::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn RouteConstraint>)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All constraints must pass.
    pub fn matches_all(&self, request: &RequestContext, values: &RouteValues, direction: RouteDirection) -> bool {
        self.entries.iter().all(|(name, c)| {
            let ok = c.matches(request, values, direction);
            if !ok {
                tracing::trace!(constraint = %name, ?direction, "Route constraint rejected");
            }
            ok
        })
    }
}

/// Matches the Host header (exact, case-insensitive). Inert during generation.
#[derive(Debug, Clone)]
pub struct HostConstraint {
    expected_host: String,
}

impl HostConstraint {
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }

    pub fn host(&self) -> &str {
        &self.expected_host
    }
}

impl RouteConstraint for HostConstraint {
    fn matches(&self, request: &RequestContext, _values: &RouteValues, direction: RouteDirection) -> bool {
        if direction == RouteDirection::UriGeneration {
            return true;
        }
        request
            .headers()
            .get("host")
            .and_then(|h| h.to_str().ok())
            .or_else(|| request.uri().host())
            .map(|h| h.to_lowercase() == self.expected_host)
            .unwrap_or(false)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;

    #[test]
    fn test_path_within_root() {
        let req = RequestContext::new(Uri::from_static("http://localhost/vpath/prefix/Customers"), "/vpath");
        assert_eq!(req.path_within_root().as_deref(), Some("prefix/Customers"));

        let req = RequestContext::new(Uri::from_static("http://localhost/VPATH"), "vpath/");
        assert_eq!(req.virtual_path_root(), "/vpath");
        assert_eq!(req.path_within_root().as_deref(), Some(""));

        let req = RequestContext::new(Uri::from_static("http://localhost/vpathology"), "/vpath");
        assert_eq!(req.path_within_root(), None);

        let req = RequestContext::new(Uri::from_static("/Customers('a%20b')"), "/");
        assert_eq!(req.path_within_root().as_deref(), Some("Customers('a b')"));
    }

    #[test]
    fn test_host_constraint() {
        let constraint = HostConstraint::new("Example.com");
        let values = RouteValues::new();

        let req = Request::builder()
            .uri("/odata")
            .header("Host", "EXAMPLE.COM")
            .body(Body::default())
            .unwrap();
        let ctx = RequestContext::from_request(&req, "/");
        assert!(constraint.matches(&ctx, &values, RouteDirection::UriResolution));

        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("other.com"));
        let ctx = RequestContext::new(Uri::from_static("/odata"), "/").with_headers(headers);
        assert!(!constraint.matches(&ctx, &values, RouteDirection::UriResolution));
        assert!(constraint.matches(&ctx, &values, RouteDirection::UriGeneration));

        // Falls back to the URI authority.
        let ctx = RequestContext::new(Uri::from_static("http://example.com/odata"), "/");
        assert!(constraint.matches(&ctx, &values, RouteDirection::UriResolution));
    }

    #[test]
    fn test_constraint_set_replaces_and_downcasts() {
        let mut set = ConstraintSet::new();
        set.insert("host", HostConstraint::new("a.com"));
        set.insert("HOST", HostConstraint::new("b.com"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_as::<HostConstraint>("host").map(|c| c.host()), Some("b.com"));
        assert!(set.get_as::<String>("host").is_none());
        assert!(set.get("missing").is_none());
    }
}
