//! Route values, generation results and error definitions.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// A single route value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum RouteValue {
    Str(String),
    Bool(bool),
}

impl RouteValue {
    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RouteValue::Str(s) => Some(s),
            RouteValue::Bool(_) => None,
        }
    }

    /// True for the empty string. Booleans are never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, RouteValue::Str(s) if s.is_empty())
    }
}

impl fmt::Display for RouteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteValue::Str(s) => f.write_str(s),
            RouteValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for RouteValue {
    fn from(s: &str) -> Self {
        RouteValue::Str(s.to_string())
    }
}

impl From<String> for RouteValue {
    fn from(s: String) -> Self {
        RouteValue::Str(s)
    }
}

impl From<bool> for RouteValue {
    fn from(b: bool) -> Self {
        RouteValue::Bool(b)
    }
}

/// Ordered mapping from route-value name to value.
///
/// Keys compare ASCII-case-insensitively. Inserting an existing key replaces
/// its value without moving it, so iteration order is first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteValues {
    entries: Vec<(String, RouteValue)>,
}

impl RouteValues {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// Insert or replace a value. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> Option<RouteValue> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&RouteValue> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// The value under `key` when it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(RouteValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<RouteValue> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RouteValues
where
    K: Into<String>,
    V: Into<RouteValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = RouteValues::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

impl Serialize for RouteValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Why a constraint is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDirection {
    /// Matching an incoming request.
    UriResolution,
    /// Generating an outbound link.
    UriGeneration,
}

/// Result of link generation: an application-relative path.
///
/// Excludes scheme, host and the virtual-path root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPathData {
    virtual_path: String,
}

impl VirtualPathData {
    pub fn new(virtual_path: impl Into<String>) -> Self {
        Self {
            virtual_path: virtual_path.into(),
        }
    }

    pub fn virtual_path(&self) -> &str {
        &self.virtual_path
    }

    pub fn into_string(self) -> String {
        self.virtual_path
    }
}

impl fmt::Display for VirtualPathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.virtual_path)
    }
}

/// Values captured by a successful inbound match.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RouteData {
    pub values: RouteValues,
}

/// Route template syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("route template must not start with '/' or '~'")]
    InvalidStart,

    #[error("route template must not contain '?'")]
    ContainsQuery,

    #[error("route template contains an empty segment")]
    EmptySegment,

    #[error("route template contains an unmatched '{{' or '}}'")]
    StrayBrace,

    #[error("catch-all parameter '{0}' must be the last segment")]
    CatchAllNotLast(String),

    #[error("catch-all parameter '{0}' must be alone in its segment")]
    CatchAllInComplexSegment(String),

    #[error("parameters '{0}' and '{1}' must be separated by a literal")]
    AdjacentParameters(String, String),

    #[error("parameter '{0}' appears more than once")]
    DuplicateParameter(String),
}

/// Errors building or querying a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid route template '{template}': {source}")]
    InvalidTemplate {
        template: String,
        #[source]
        source: TemplateError,
    },

    #[error("a route named '{0}' is already registered")]
    DuplicateRoute(String),

    #[error("no route named '{0}'")]
    UnknownRoute(String),
}

/// Result type for route table operations.
pub type RouteResult<T> = Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut values = RouteValues::new();
        values.insert("odataPath", "Customers");
        assert_eq!(values.get_str("ODATAPATH"), Some("Customers"));
        assert!(values.contains_key("odatapath"));

        let previous = values.insert("ODataPath", "Orders");
        assert_eq!(previous, Some(RouteValue::from("Customers")));
        assert_eq!(values.len(), 1);
        // Original key spelling is kept.
        assert_eq!(values.iter().next().map(|(k, _)| k), Some("odataPath"));
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let values: RouteValues = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let keys: Vec<&str> = values.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_bool_values_are_not_strings() {
        let mut values = RouteValues::new();
        values.insert("httproute", true);
        assert_eq!(values.get_str("httproute"), None);
        assert!(!values.get("httproute").unwrap().is_empty());
        assert_eq!(values.remove("HttpRoute"), Some(RouteValue::Bool(true)));
        assert!(values.is_empty());
    }

    #[test]
    fn test_values_serialize_as_map() {
        let mut values = RouteValues::new();
        values.insert("odataPath", "Customers");
        values.insert("httproute", true);
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"{"odataPath":"Customers","httproute":true}"#);
    }

    #[test]
    fn test_error_display() {
        let err = RouteError::InvalidTemplate {
            template: "a/{*rest}/b".into(),
            source: TemplateError::CatchAllNotLast("rest".into()),
        };
        assert!(err.to_string().contains("must be the last segment"));
    }
}
