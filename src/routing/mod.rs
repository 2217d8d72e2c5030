//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (uri, headers)
//!     → router.rs (route table lookup, first match wins)
//!     → template.rs (segment matching against the route template)
//!     → matcher.rs / version.rs (evaluate route constraints)
//!     → Return: RouteMatch or NoMatch
//!
//! Link Generation:
//!     route values { odataPath, httproute }
//!     → odata_route.rs (direct concatenation or delegated binding)
//!     → encoding.rs (path escaping)
//!     → VirtualPathData
//! ```
//!
//! # Design Decisions
//! - Routes are built at startup and immutable once shared
//! - The link strategy of an OData route is fixed at construction
//! - Direct and delegated links share one encoding table

pub mod encoding;
pub mod http_route;
pub mod matcher;
pub mod odata_route;
pub mod router;
pub mod template;
pub mod types;
pub mod version;

pub use http_route::HttpRoute;
pub use matcher::{ConstraintSet, HostConstraint, RequestContext, RouteConstraint};
pub use odata_route::{LinkStrategy, ODataRoute, ODataRouteBuilder};
pub use router::{RouteMatch, RouteTable};
pub use template::RouteTemplate;
pub use types::{RouteData, RouteDirection, RouteError, RouteValue, RouteValues, TemplateError, VirtualPathData};
pub use version::{ODataVersion, VersionConstraint};

/// Route value holding the OData path suffix.
pub const ODATA_PATH: &str = "odataPath";

/// Catch-all segment appended to every OData route prefix.
pub const ODATA_PATH_TEMPLATE: &str = "{*odataPath}";

/// Marker route value: link generation is only attempted when present.
pub const HTTP_ROUTE_KEY: &str = "httproute";

/// Constraint slot holding the [`VersionConstraint`].
pub const VERSION_CONSTRAINT_NAME: &str = "ODataVersionConstraint";

/// Constraint slot holding the caller-supplied OData path constraint.
pub const PATH_CONSTRAINT_NAME: &str = "ODataConstraint";

/// A route that can match requests and generate links.
pub trait Route: Send + Sync + std::fmt::Debug {
    /// The template this route was built from.
    fn route_template(&self) -> &str;

    /// Values captured from `request`, or `None` if the route does not match.
    fn route_data(&self, request: &RequestContext) -> Option<RouteData>;

    /// The link for `values`, or `None` if this route cannot produce one.
    fn virtual_path(&self, request: &RequestContext, values: &RouteValues) -> Option<VirtualPathData>;
}
