//! OData route matching and link generation library

pub mod config;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::schema::RoutingConfig;
pub use http::HttpServer;
pub use routing::{ODataRoute, RouteTable};
