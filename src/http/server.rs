//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the route-resolution middleware
//! - Resolve every request against the route table
//! - Attach the match to the request or answer 404
//! - Describe the match, including the link regenerated from its values

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, State},
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::RoutingConfig;
use crate::routing::{RequestContext, RouteError, RouteMatch, RouteTable, RouteValues, VirtualPathData, HTTP_ROUTE_KEY};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
}

/// Body returned for a resolved request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescription {
    pub route: String,
    pub values: RouteValues,
    pub link: Option<String>,
}

/// HTTP server exposing the route table.
pub struct HttpServer {
    router: Router,
    config: RoutingConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RoutingConfig) -> Result<Self, RouteError> {
        let routes = Arc::new(RouteTable::from_config(&config)?);
        let router = Self::build_router(routes);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(routes: Arc<RouteTable>) -> Router {
        let state = AppState { routes };
        Router::new()
            .fallback(describe_route)
            .layer(middleware::from_fn_with_state(state.clone(), odata_route_middleware))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The configured Axum router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolves the request against the route table.
/// A match is attached as a [`RouteMatch`] extension.
pub async fn odata_route_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let ctx = RequestContext::from_request(&req, state.routes.virtual_path_root());
    match state.routes.match_request(&ctx) {
        Some(found) => {
            req.extensions_mut().insert(found);
            next.run(req).await
        }
        None => {
            tracing::warn!(path = %req.uri().path(), "No OData route matched");
            (StatusCode::NOT_FOUND, "No matching OData route").into_response()
        }
    }
}

/// Reports the matched route, its values and the link they regenerate.
async fn describe_route(
    State(state): State<AppState>,
    Extension(found): Extension<RouteMatch>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, "Only GET is supported").into_response();
    }

    let ctx = state.routes.request(uri).with_headers(headers);
    let mut values = found.values.clone();
    values.insert(HTTP_ROUTE_KEY, true);

    let link = match state.routes.virtual_path(&found.route, &ctx, &values) {
        Ok(link) => link.map(VirtualPathData::into_string),
        Err(e) => {
            tracing::error!(route = %found.route, error = %e, "Matched route missing from table");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Route lookup failed").into_response();
        }
    };

    Json(RouteDescription {
        route: found.route,
        values: found.values,
        link,
    })
    .into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received");
}
