//! General templated route: the reference matching and link-generation engine.
//!
//! # Responsibilities
//! - Match request paths against a parsed template, then run constraints
//! - Bind route values into a virtual path, then run constraints
//! - Only generate links when the caller marks the values with `httproute`

use crate::routing::matcher::{ConstraintSet, RequestContext, RouteConstraint};
use crate::routing::template::RouteTemplate;
use crate::routing::types::{
    RouteData, RouteDirection, RouteError, RouteValue, RouteValues, VirtualPathData,
};
use crate::routing::{Route, HTTP_ROUTE_KEY};

/// A route built from a template, defaults and constraints.
#[derive(Debug, Clone)]
pub struct HttpRoute {
    template: RouteTemplate,
    defaults: RouteValues,
    constraints: ConstraintSet,
}

impl HttpRoute {
    /// Parse and validate `template`.
    pub fn new(template: &str) -> Result<Self, RouteError> {
        let parsed = RouteTemplate::parse(template);
        parsed.validate().map_err(|source| RouteError::InvalidTemplate {
            template: template.to_string(),
            source,
        })?;
        Ok(Self::from_template(parsed))
    }

    /// Wrap an already parsed template without validating it.
    pub(crate) fn from_template(template: RouteTemplate) -> Self {
        Self {
            template,
            defaults: RouteValues::new(),
            constraints: ConstraintSet::new(),
        }
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> Self {
        self.defaults.insert(key, value);
        self
    }

    pub fn with_constraint(mut self, name: impl Into<String>, constraint: impl RouteConstraint + 'static) -> Self {
        self.constraints.insert(name, constraint);
        self
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    pub fn defaults(&self) -> &RouteValues {
        &self.defaults
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut ConstraintSet {
        &mut self.constraints
    }
}

impl Route for HttpRoute {
    fn route_template(&self) -> &str {
        self.template.as_str()
    }

    fn route_data(&self, request: &RequestContext) -> Option<RouteData> {
        let path = request.path_within_root()?;
        let values = self.template.match_path(&path, &self.defaults)?;
        if !self
            .constraints
            .matches_all(request, &values, RouteDirection::UriResolution)
        {
            return None;
        }
        Some(RouteData { values })
    }

    fn virtual_path(&self, request: &RequestContext, values: &RouteValues) -> Option<VirtualPathData> {
        if !values.contains_key(HTTP_ROUTE_KEY) {
            return None;
        }
        let mut values = values.clone();
        values.remove(HTTP_ROUTE_KEY);

        let path = self.template.bind(&values, &self.defaults)?;
        if !self
            .constraints
            .matches_all(request, &values, RouteDirection::UriGeneration)
        {
            return None;
        }
        Some(VirtualPathData::new(path))
    }
}
