//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the routing service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Application root every route is relative to (e.g., "/vpath").
    pub virtual_path_root: String,

    /// OData routes, matched in the order given.
    pub routes: Vec<ODataRouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            virtual_path_root: "/".to_string(),
            routes: Vec::new(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A single OData route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ODataRouteConfig {
    /// Route identifier for lookups and logging.
    pub name: String,

    /// Prefix before the OData path; omit to serve from the root.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Accept requests carrying pre-4.0 version headers.
    #[serde(default)]
    pub relaxed_version: bool,

    /// Host header to require (exact match, case-insensitive).
    #[serde(default)]
    pub host: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
