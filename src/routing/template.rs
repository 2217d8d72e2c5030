//! Route template parsing, matching and binding.
//!
//! # Syntax
//! ```text
//! template  = segment *( "/" segment )
//! segment   = *( literal / parameter )
//! parameter = "{" name "}" / "{*" name "}"    ; the second form is a catch-all
//! literal   = any text, "{{" and "}}" escape braces
//! ```
//!
//! # Design Decisions
//! - Parsing is total: malformed braces stay literal text and are reported by
//!   [`RouteTemplate::validate`] rather than at parse time
//! - Literal comparison is ASCII-case-insensitive
//! - A catch-all always yields a value on match (`""` when nothing remains)

use crate::routing::encoding::{encode_data, encode_path};
use crate::routing::types::{RouteValues, TemplateError};

/// One piece of a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Parameter { name: String, catch_all: bool },
}

/// A `/`-delimited segment made of literal and parameter parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSegment {
    parts: Vec<TemplatePart>,
}

impl TemplateSegment {
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// The catch-all name when this segment is exactly one catch-all parameter.
    fn sole_catch_all(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [TemplatePart::Parameter { name, catch_all: true }] => Some(name.as_str()),
            _ => None,
        }
    }

    fn parameters(&self) -> impl Iterator<Item = (&str, bool)> {
        self.parts.iter().filter_map(|p| match p {
            TemplatePart::Parameter { name, catch_all } => Some((name.as_str(), *catch_all)),
            TemplatePart::Literal(_) => None,
        })
    }
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<TemplateSegment>,
    stray_brace: bool,
}

impl RouteTemplate {
    /// Parse a template. Never fails; see [`RouteTemplate::validate`].
    pub fn parse(template: &str) -> Self {
        let mut stray_brace = false;
        let segments = if template.is_empty() {
            Vec::new()
        } else {
            template
                .split('/')
                .map(|s| parse_segment(s, &mut stray_brace))
                .collect()
        };

        Self {
            raw: template.to_string(),
            segments,
            stray_brace,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// True when any segment holds a `{parameter}`.
    pub fn has_parameters(&self) -> bool {
        self.segments.iter().any(|s| s.parameters().next().is_some())
    }

    /// Names of all parameters in template order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().flat_map(|s| s.parameters().map(|(n, _)| n))
    }

    /// The template rendered as plain text: escapes resolved, parameters kept
    /// in `{name}` form.
    pub fn literal_text(&self) -> String {
        let segments: Vec<String> = self
            .segments
            .iter()
            .map(|segment| {
                segment
                    .parts
                    .iter()
                    .map(|part| match part {
                        TemplatePart::Literal(text) => text.clone(),
                        TemplatePart::Parameter { name, catch_all: true } => format!("{{*{}}}", name),
                        TemplatePart::Parameter { name, .. } => format!("{{{}}}", name),
                    })
                    .collect()
            })
            .collect();
        segments.join("/")
    }

    /// Strict structural checks.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.raw.starts_with('/') || self.raw.starts_with('~') {
            return Err(TemplateError::InvalidStart);
        }
        if self.raw.contains('?') {
            return Err(TemplateError::ContainsQuery);
        }
        if self.stray_brace {
            return Err(TemplateError::StrayBrace);
        }

        let last = self.segments.len().saturating_sub(1);
        let mut seen: Vec<&str> = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if segment.parts.is_empty() {
                return Err(TemplateError::EmptySegment);
            }

            let mut previous_param: Option<&str> = None;
            for part in &segment.parts {
                match part {
                    TemplatePart::Literal(_) => previous_param = None,
                    TemplatePart::Parameter { name, catch_all } => {
                        if *catch_all {
                            if i != last {
                                return Err(TemplateError::CatchAllNotLast(name.clone()));
                            }
                            if segment.parts.len() != 1 {
                                return Err(TemplateError::CatchAllInComplexSegment(name.clone()));
                            }
                        }
                        if let Some(prev) = previous_param {
                            return Err(TemplateError::AdjacentParameters(
                                prev.to_string(),
                                name.clone(),
                            ));
                        }
                        if seen.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                            return Err(TemplateError::DuplicateParameter(name.clone()));
                        }
                        seen.push(name);
                        previous_param = Some(name.as_str());
                    }
                }
            }
        }
        Ok(())
    }

    /// Match a decoded, root-relative request path (no leading `/`).
    ///
    /// `defaults` supply values for trailing segments that are absent from the
    /// path and are copied into the result for keys the path did not set.
    pub fn match_path(&self, path: &str, defaults: &RouteValues) -> Option<RouteValues> {
        let request: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        let mut values = RouteValues::new();
        let mut consumed_all = false;
        for (i, segment) in self.segments.iter().enumerate() {
            if let Some(name) = segment.sole_catch_all() {
                let rest = request.get(i..).map(|r| r.join("/")).unwrap_or_default();
                values.insert(name, rest);
                consumed_all = true;
                break;
            }

            match request.get(i) {
                Some(actual) => match_segment(segment, actual, &mut values)?,
                None => {
                    // Absent trailing segments only match through defaults.
                    let all_defaulted = segment
                        .parts
                        .iter()
                        .all(|p| matches!(p, TemplatePart::Parameter { name, .. } if defaults.contains_key(name)));
                    if !all_defaulted || segment.parts.is_empty() {
                        return None;
                    }
                }
            }
        }

        if !consumed_all && request.len() > self.segments.len() {
            return None;
        }

        for (key, value) in defaults.iter() {
            if !values.contains_key(key) {
                values.insert(key, value.clone());
            }
        }
        Some(values)
    }

    /// Bind route values into a path, appending unused values as a query string.
    ///
    /// Returns `None` when a non-catch-all parameter has no value.
    pub fn bind(&self, values: &RouteValues, defaults: &RouteValues) -> Option<String> {
        let mut rendered: Vec<String> = Vec::with_capacity(self.segments.len());
        let mut used: Vec<&str> = Vec::new();

        for segment in &self.segments {
            if let Some(name) = segment.sole_catch_all() {
                used.push(name);
                let value = values
                    .get(name)
                    .filter(|v| !v.is_empty())
                    .or_else(|| defaults.get(name).filter(|v| !v.is_empty()));
                if let Some(value) = value {
                    rendered.push(encode_path(&value.to_string()));
                }
                break;
            }

            let mut out = String::new();
            for part in &segment.parts {
                match part {
                    TemplatePart::Literal(text) => out.push_str(&encode_path(text)),
                    TemplatePart::Parameter { name, .. } => {
                        used.push(name);
                        let value = values
                            .get(name)
                            .filter(|v| !v.is_empty())
                            .or_else(|| defaults.get(name).filter(|v| !v.is_empty()))?;
                        out.push_str(&encode_path(&value.to_string()));
                    }
                }
            }
            rendered.push(out);
        }

        let mut url = rendered.join("/");

        let mut separator = '?';
        for (key, value) in values.iter() {
            if used.iter().any(|u| u.eq_ignore_ascii_case(key)) || value.is_empty() {
                continue;
            }
            if defaults.get(key) == Some(value) {
                continue;
            }
            url.push(separator);
            url.push_str(&encode_data(key));
            url.push('=');
            url.push_str(&encode_data(&value.to_string()));
            separator = '&';
        }

        Some(url)
    }
}

fn parse_segment(segment: &str, stray_brace: &mut bool) -> TemplateSegment {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = segment;

    while let Some(c) = rest.chars().next() {
        match c {
            '{' if rest.starts_with("{{") => {
                literal.push('{');
                rest = &rest[2..];
            }
            '}' if rest.starts_with("}}") => {
                literal.push('}');
                rest = &rest[2..];
            }
            '{' => {
                let parameter = rest[1..].find('}').and_then(|end| {
                    let inner = &rest[1..1 + end];
                    let (name, catch_all) = match inner.strip_prefix('*') {
                        Some(name) => (name, true),
                        None => (inner, false),
                    };
                    if name.is_empty() || name.contains('{') {
                        None
                    } else {
                        Some((name, catch_all, end + 2))
                    }
                });

                match parameter {
                    Some((name, catch_all, len)) => {
                        if !literal.is_empty() {
                            parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                        }
                        parts.push(TemplatePart::Parameter {
                            name: name.to_string(),
                            catch_all,
                        });
                        rest = &rest[len..];
                    }
                    None => {
                        *stray_brace = true;
                        literal.push('{');
                        rest = &rest[1..];
                    }
                }
            }
            '}' => {
                *stray_brace = true;
                literal.push('}');
                rest = &rest[1..];
            }
            _ => {
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }
    TemplateSegment { parts }
}

/// Match one request segment, capturing parameters into `values`.
fn match_segment(segment: &TemplateSegment, actual: &str, values: &mut RouteValues) -> Option<()> {
    match segment.parts.as_slice() {
        [] => actual.is_empty().then_some(()),
        [TemplatePart::Literal(text)] => actual.eq_ignore_ascii_case(text).then_some(()),
        [TemplatePart::Parameter { name, .. }] => {
            if actual.is_empty() {
                return None;
            }
            values.insert(name.as_str(), actual);
            Some(())
        }
        parts => match_complex_segment(parts, actual, values),
    }
}

/// Right-to-left match of a segment mixing literals and parameters.
fn match_complex_segment(parts: &[TemplatePart], actual: &str, values: &mut RouteValues) -> Option<()> {
    let lowered = actual.to_ascii_lowercase();
    let mut end = actual.len();
    let mut pending: Option<&str> = None;

    for part in parts.iter().rev() {
        match part {
            TemplatePart::Literal(text) => {
                let needle = text.to_ascii_lowercase();
                let start = lowered[..end].rfind(&needle)?;
                let literal_end = start + needle.len();
                match pending.take() {
                    Some(name) => {
                        let value = &actual[literal_end..end];
                        if value.is_empty() {
                            return None;
                        }
                        values.insert(name, value);
                    }
                    None if literal_end != end => return None,
                    None => {}
                }
                end = start;
            }
            TemplatePart::Parameter { name, .. } => {
                if pending.is_some() {
                    return None;
                }
                pending = Some(name.as_str());
            }
        }
    }

    match pending {
        Some(name) if end > 0 => {
            values.insert(name, &actual[..end]);
            Some(())
        }
        Some(_) => None,
        None => (end == 0).then_some(()),
    }
}
