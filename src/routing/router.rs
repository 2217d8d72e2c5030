//! Route table lookup and named link generation.
//!
//! # Responsibilities
//! - Store routes by name under one virtual-path root
//! - Look up the first route matching a request
//! - Generate links through a named route
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in registration order; first match wins
//! - Explicit `UnknownRoute` rather than silently returning no link

use std::sync::Arc;

use axum::http::Uri;
use serde::Serialize;

use crate::config::schema::RoutingConfig;
use crate::routing::http_route::HttpRoute;
use crate::routing::matcher::{normalize_root, HostConstraint, RequestContext};
use crate::routing::odata_route::ODataRoute;
use crate::routing::types::{RouteError, RouteResult, RouteValues, VirtualPathData};
use crate::routing::Route;

/// Constraint slot used for hosts configured on a route.
pub const HOST_CONSTRAINT_NAME: &str = "host";

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub route: String,
    pub values: RouteValues,
}

#[derive(Debug, Clone)]
struct NamedRoute {
    name: String,
    route: Arc<dyn Route>,
}

/// Named routes sharing a virtual-path root.
#[derive(Debug, Clone)]
pub struct RouteTable {
    virtual_path_root: String,
    routes: Vec<NamedRoute>,
}

impl RouteTable {
    pub fn new(virtual_path_root: &str) -> Self {
        Self {
            virtual_path_root: normalize_root(virtual_path_root),
            routes: Vec::new(),
        }
    }

    /// Build a table from configuration. Routes keep their configured order.
    pub fn from_config(config: &RoutingConfig) -> RouteResult<Self> {
        let mut table = Self::new(&config.virtual_path_root);
        for route_config in &config.routes {
            let mut builder = ODataRoute::builder(route_config.prefix.as_deref());
            if route_config.relaxed_version {
                builder = builder.relaxed_version_matching();
            }
            if let Some(host) = &route_config.host {
                builder = builder.constraint(HOST_CONSTRAINT_NAME, HostConstraint::new(host.as_str()));
            }
            table.map_odata_route(&route_config.name, builder.build())?;
        }
        Ok(table)
    }

    pub fn virtual_path_root(&self) -> &str {
        &self.virtual_path_root
    }

    /// Register any route under `name`.
    pub fn add(&mut self, name: &str, route: impl Route + 'static) -> RouteResult<()> {
        if self.get(name).is_some() {
            return Err(RouteError::DuplicateRoute(name.to_string()));
        }
        tracing::info!(route = %name, template = %route.route_template(), "Route registered");
        self.routes.push(NamedRoute {
            name: name.to_string(),
            route: Arc::new(route),
        });
        Ok(())
    }

    pub fn map_odata_route(&mut self, name: &str, route: ODataRoute) -> RouteResult<()> {
        self.add(name, route)
    }

    /// Parse `template` and register it as a general route.
    pub fn map_http_route(&mut self, name: &str, template: &str) -> RouteResult<()> {
        self.add(name, HttpRoute::new(template)?)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Route>> {
        self.routes
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .map(|r| &r.route)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// A request context bound to this table's virtual-path root.
    pub fn request(&self, uri: Uri) -> RequestContext {
        RequestContext::new(uri, self.virtual_path_root.as_str())
    }

    /// The first route accepting `request`.
    pub fn match_request(&self, request: &RequestContext) -> Option<RouteMatch> {
        let found = self.routes.iter().find_map(|r| {
            r.route.route_data(request).map(|data| RouteMatch {
                route: r.name.clone(),
                values: data.values,
            })
        });
        match &found {
            Some(m) => tracing::debug!(uri = %request.uri(), route = %m.route, "Route matched"),
            None => tracing::debug!(uri = %request.uri(), "No route matched"),
        }
        found
    }

    /// Generate a link through the route registered as `name`.
    pub fn virtual_path(
        &self,
        name: &str,
        request: &RequestContext,
        values: &RouteValues,
    ) -> RouteResult<Option<VirtualPathData>> {
        let route = self
            .get(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;
        Ok(route.virtual_path(request, values))
    }
}
