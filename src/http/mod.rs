//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer)
//!     → odata_route_middleware (route table lookup, RouteMatch extension)
//!     → describe_route (matched values + regenerated link as JSON)
//! ```

pub mod server;

pub use server::{odata_route_middleware, AppState, HttpServer, RouteDescription};
