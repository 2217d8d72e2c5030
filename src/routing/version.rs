//! OData protocol version constraint.
//!
//! # Headers
//! - `OData-Version`: the version the request is written in
//! - `OData-MaxVersion`: the highest version the client accepts
//! - `DataServiceVersion` / `MaxDataServiceVersion`: pre-4.0 equivalents
//!
//! # Matching Rules (inbound only; generation always passes)
//! ```text
//! strict mode and any pre-4.0 header present    → reject
//! OData-Version present                         → version == service version
//! else OData-MaxVersion present                 → min(max, service) == service
//! else                                          → accept
//! unparseable header value                      → reject
//! ```

use std::any::Any;
use std::fmt;
use std::str::FromStr;

use axum::http::HeaderMap;

use crate::routing::matcher::{RequestContext, RouteConstraint};
use crate::routing::types::{RouteDirection, RouteValues};

pub const ODATA_VERSION_HEADER: &str = "OData-Version";
pub const ODATA_MAX_VERSION_HEADER: &str = "OData-MaxVersion";
pub const LEGACY_VERSION_HEADER: &str = "DataServiceVersion";
pub const LEGACY_MAX_VERSION_HEADER: &str = "MaxDataServiceVersion";

/// OData protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ODataVersion {
    V1,
    V2,
    V3,
    V4,
    V401,
}

impl ODataVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ODataVersion::V1 => "1.0",
            ODataVersion::V2 => "2.0",
            ODataVersion::V3 => "3.0",
            ODataVersion::V4 => "4.0",
            ODataVersion::V401 => "4.01",
        }
    }
}

impl fmt::Display for ODataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for version strings outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown OData version '{0}'")]
pub struct UnknownVersion(pub String);

impl FromStr for ODataVersion {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_matches(|c: char| c == ' ' || c == ';') {
            "1.0" => Ok(ODataVersion::V1),
            "2.0" => Ok(ODataVersion::V2),
            "3.0" => Ok(ODataVersion::V3),
            "4.0" => Ok(ODataVersion::V4),
            "4.01" => Ok(ODataVersion::V401),
            other => Err(UnknownVersion(other.to_string())),
        }
    }
}

/// Accepts requests whose declared protocol version matches the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    version: ODataVersion,
    is_relaxed_match: bool,
}

impl Default for VersionConstraint {
    fn default() -> Self {
        Self {
            version: ODataVersion::V4,
            is_relaxed_match: false,
        }
    }
}

impl VersionConstraint {
    /// A strict constraint for OData 4.0.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: ODataVersion) -> Self {
        self.version = version;
        self
    }

    /// Ignore pre-4.0 version headers instead of rejecting on them.
    pub fn relaxed(mut self) -> Self {
        self.is_relaxed_match = true;
        self
    }

    pub fn version(&self) -> ODataVersion {
        self.version
    }

    pub fn is_relaxed_match(&self) -> bool {
        self.is_relaxed_match
    }

    /// The version a request is taken to speak, or `None` if its headers are unusable.
    pub fn request_version(&self, headers: &HeaderMap) -> Option<ODataVersion> {
        if let Some(declared) = header_version(headers, ODATA_VERSION_HEADER) {
            return declared.ok();
        }
        match header_version(headers, ODATA_MAX_VERSION_HEADER) {
            Some(max) => max.ok().map(|max| max.min(self.version)),
            None => Some(self.version),
        }
    }
}

/// `None` when the header is absent, `Some(Err)` when it does not parse.
fn header_version(headers: &HeaderMap, name: &str) -> Option<Result<ODataVersion, UnknownVersion>> {
    headers.get(name).map(|value| {
        value
            .to_str()
            .map_err(|_| UnknownVersion(String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .and_then(|s| s.parse::<ODataVersion>())
    })
}

impl RouteConstraint for VersionConstraint {
    fn matches(&self, request: &RequestContext, _values: &RouteValues, direction: RouteDirection) -> bool {
        if direction == RouteDirection::UriGeneration {
            return true;
        }

        let headers = request.headers();
        if !self.is_relaxed_match
            && (headers.contains_key(LEGACY_VERSION_HEADER) || headers.contains_key(LEGACY_MAX_VERSION_HEADER))
        {
            tracing::debug!(uri = %request.uri(), "Pre-4.0 version header rejected by strict version constraint");
            return false;
        }

        self.request_version(headers) == Some(self.version)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
