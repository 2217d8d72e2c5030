//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route names are present and unique
//! - Check prefixes form valid route templates
//! - Validate the listener address and log level
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RoutingConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RoutingConfig;
use crate::routing::template::{RouteTemplate, TemplatePart};
use crate::routing::types::TemplateError;
use crate::routing::ODATA_PATH;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error("route #{0} has an empty name")]
    EmptyRouteName(usize),

    #[error("route name '{0}' is used more than once")]
    DuplicateRouteName(String),

    #[error("route '{route}' has an invalid prefix: {source}")]
    Prefix {
        route: String,
        #[source]
        source: TemplateError,
    },

    #[error("route '{0}' uses the reserved parameter name 'odataPath' in its prefix")]
    ReservedParameter(String),
}

/// Check `config`, returning every problem found.
pub fn validate_config(config: &RoutingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    let mut seen: Vec<&str> = Vec::new();
    for (i, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName(i));
        } else if seen.iter().any(|s| s.eq_ignore_ascii_case(&route.name)) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        } else {
            seen.push(&route.name);
        }

        let Some(prefix) = route.prefix.as_deref().map(|p| p.trim_matches('/')) else {
            continue;
        };
        if prefix.is_empty() {
            continue;
        }
        let template = RouteTemplate::parse(prefix);
        if let Err(source) = template.validate() {
            errors.push(ValidationError::Prefix {
                route: route.name.clone(),
                source,
            });
            continue;
        }
        let catch_all = template
            .segments()
            .iter()
            .flat_map(|s| s.parts())
            .find_map(|p| match p {
                TemplatePart::Parameter { name, catch_all: true } => Some(name.clone()),
                _ => None,
            });
        if let Some(name) = catch_all {
            // The prefix is always followed by the OData path segment.
            errors.push(ValidationError::Prefix {
                route: route.name.clone(),
                source: TemplateError::CatchAllNotLast(name),
            });
            continue;
        }
        if template.parameter_names().any(|n| n.eq_ignore_ascii_case(ODATA_PATH)) {
            errors.push(ValidationError::ReservedParameter(route.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
