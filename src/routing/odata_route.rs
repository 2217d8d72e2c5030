//! OData route: a prefix followed by the `{*odataPath}` catch-all.
//!
//! # Responsibilities
//! - Build the route template from an optional prefix
//! - Attach the version constraint and any caller-supplied constraints
//! - Generate links directly when the prefix is plain text, otherwise through
//!   the general template engine
//!
//! # Design Decisions
//! - The link strategy is decided once at construction and never re-checked
//! - Direct links skip constraint evaluation; every constraint on this route is
//!   inert during generation
//! - The relaxed-version toggle consumes the route, so it cannot run once the
//!   route is shared

use crate::routing::encoding::encode_path;
use crate::routing::http_route::HttpRoute;
use crate::routing::matcher::{ConstraintSet, RequestContext, RouteConstraint};
use crate::routing::template::RouteTemplate;
use crate::routing::types::{RouteData, RouteValues, VirtualPathData};
use crate::routing::version::VersionConstraint;
use crate::routing::{
    Route, HTTP_ROUTE_KEY, ODATA_PATH, ODATA_PATH_TEMPLATE, PATH_CONSTRAINT_NAME, VERSION_CONSTRAINT_NAME,
};

/// How a route produces virtual paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStrategy {
    /// Prefix is plain text: concatenate and encode.
    Direct,
    /// Prefix has parameters: bind through the template engine.
    Delegated,
}

/// A route serving an OData service under a prefix.
#[derive(Debug, Clone)]
pub struct ODataRoute {
    prefix: Option<String>,
    /// Prefix as it renders in a link, with `{{`/`}}` escapes resolved.
    link_prefix: Option<String>,
    strategy: LinkStrategy,
    route: HttpRoute,
}

impl ODataRoute {
    /// A route with the default strict version constraint and no path constraint.
    pub fn new(prefix: Option<&str>) -> Self {
        Self::builder(prefix).build()
    }

    pub fn builder(prefix: Option<&str>) -> ODataRouteBuilder {
        ODataRouteBuilder::new(prefix)
    }

    /// The normalized prefix; `None` when the route sits at the root.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn link_strategy(&self) -> LinkStrategy {
        self.strategy
    }

    pub fn can_generate_direct_link(&self) -> bool {
        self.strategy == LinkStrategy::Direct
    }

    pub fn constraints(&self) -> &ConstraintSet {
        self.route.constraints()
    }

    /// The version constraint stored under [`VERSION_CONSTRAINT_NAME`].
    pub fn version_constraint(&self) -> Option<&VersionConstraint> {
        self.constraints().get_as::<VersionConstraint>(VERSION_CONSTRAINT_NAME)
    }

    /// Switch the version constraint to relaxed matching and return the route.
    pub fn has_relaxed_odata_version_constraint(mut self) -> Self {
        let relaxed = self
            .version_constraint()
            .cloned()
            .unwrap_or_default()
            .relaxed();
        self.route
            .constraints_mut()
            .insert(VERSION_CONSTRAINT_NAME, relaxed);
        self
    }

    /// Build a virtual path for `odata_path` by concatenation.
    ///
    /// Only equivalent to the template engine when
    /// [`can_generate_direct_link`](Self::can_generate_direct_link) holds.
    pub fn generate_link_directly(&self, odata_path: &str) -> VirtualPathData {
        let link = combine_path_segments(self.link_prefix.as_deref(), odata_path);
        VirtualPathData::new(encode_path(&link))
    }
}

fn combine_path_segments(prefix: Option<&str>, odata_path: &str) -> String {
    match prefix {
        None | Some("") => odata_path.to_string(),
        Some(prefix) if odata_path.is_empty() => prefix.to_string(),
        Some(prefix) => format!("{}/{}", prefix, odata_path),
    }
}

impl Route for ODataRoute {
    fn route_template(&self) -> &str {
        self.route.route_template()
    }

    fn route_data(&self, request: &RequestContext) -> Option<RouteData> {
        self.route.route_data(request)
    }

    fn virtual_path(&self, request: &RequestContext, values: &RouteValues) -> Option<VirtualPathData> {
        if !values.contains_key(HTTP_ROUTE_KEY) {
            return None;
        }
        let odata_path = values.get_str(ODATA_PATH)?;

        let link = match self.strategy {
            LinkStrategy::Direct => Some(self.generate_link_directly(odata_path)),
            LinkStrategy::Delegated => self.route.virtual_path(request, values),
        };
        tracing::trace!(
            template = %self.route_template(),
            strategy = ?self.strategy,
            link = ?link.as_ref().map(VirtualPathData::virtual_path),
            "Generated OData link"
        );
        link
    }
}

/// Pre-publication configuration of an [`ODataRoute`].
#[derive(Debug)]
pub struct ODataRouteBuilder {
    prefix: Option<String>,
    version: VersionConstraint,
    constraints: ConstraintSet,
}

impl ODataRouteBuilder {
    fn new(prefix: Option<&str>) -> Self {
        let prefix = prefix
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self {
            prefix,
            version: VersionConstraint::new(),
            constraints: ConstraintSet::new(),
        }
    }

    /// Replace the version constraint.
    pub fn version_constraint(mut self, constraint: VersionConstraint) -> Self {
        self.version = constraint;
        self
    }

    pub fn relaxed_version_matching(mut self) -> Self {
        self.version = self.version.relaxed();
        self
    }

    /// Attach the caller's OData path constraint under [`PATH_CONSTRAINT_NAME`].
    pub fn path_constraint(self, constraint: impl RouteConstraint + 'static) -> Self {
        self.constraint(PATH_CONSTRAINT_NAME, constraint)
    }

    /// Attach an extra named constraint. The version slot is reserved.
    pub fn constraint(mut self, name: impl Into<String>, constraint: impl RouteConstraint + 'static) -> Self {
        let name = name.into();
        if name.eq_ignore_ascii_case(VERSION_CONSTRAINT_NAME) {
            tracing::warn!(constraint = %name, "Ignoring constraint registered under the reserved version key");
            return self;
        }
        self.constraints.insert(name, constraint);
        self
    }

    pub fn build(self) -> ODataRoute {
        let template = match self.prefix.as_deref() {
            Some(prefix) => format!("{}/{}", prefix, ODATA_PATH_TEMPLATE),
            None => ODATA_PATH_TEMPLATE.to_string(),
        };

        let parsed_prefix = self.prefix.as_deref().map(RouteTemplate::parse);
        let strategy = match &parsed_prefix {
            Some(prefix) if prefix.has_parameters() => LinkStrategy::Delegated,
            _ => LinkStrategy::Direct,
        };
        let link_prefix = parsed_prefix.as_ref().map(RouteTemplate::literal_text);

        let mut route = HttpRoute::from_template(RouteTemplate::parse(&template));
        let constraints = route.constraints_mut();
        constraints.insert(VERSION_CONSTRAINT_NAME, self.version);
        for (name, constraint) in self.constraints.iter() {
            constraints.insert_arc(name, constraint.clone());
        }

        tracing::debug!(template = %template, strategy = ?strategy, "Built OData route");
        ODataRoute {
            prefix: self.prefix,
            link_prefix,
            strategy,
            route,
        }
    }
}
