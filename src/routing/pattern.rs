//! Route path patterns.
//!
//! A pattern is split on `/`. A segment written as `:name` (a colon followed
//! by one or more ASCII letters) captures exactly one request path segment;
//! every other segment must match literally. Patterns without any capturing
//! segment are exact and matched by string equality.

use regex::Regex;

use crate::server::{Error, Parameters};

/// A compiled route path.
#[derive(Debug, Clone)]
pub enum PathPattern {
    /// No parameter segments; matched by literal equality.
    Exact(String),
    /// At least one `:name` segment.
    Dynamic(DynamicPattern),
}

/// A parametrized pattern compiled to an anchored regex.
#[derive(Debug, Clone)]
pub struct DynamicPattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

/// The parameter name of a `:name` segment, if `segment` is one.
fn parameter_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(':')
        .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()))
}

impl PathPattern {
    /// Compile a route path.
    ///
    /// Fails when the same parameter name appears twice.
    pub fn compile(path: &str) -> Result<Self, Error> {
        let mut names: Vec<String> = Vec::new();
        let mut parts = Vec::new();

        for segment in path.split('/') {
            match parameter_name(segment) {
                Some(name) => {
                    if names.iter().any(|existing| existing == name) {
                        return Err(Error::InvalidRoute(
                            path.to_string(),
                            format!("duplicate parameter :{name}"),
                        ));
                    }
                    names.push(name.to_string());
                    parts.push("([^/]+)".to_string());
                }
                None => parts.push(regex::escape(segment)),
            }
        }

        if names.is_empty() {
            return Ok(PathPattern::Exact(path.to_string()));
        }

        let regex = Regex::new(&format!("^{}$", parts.join("/")))
            .map_err(|e| Error::InvalidRoute(path.to_string(), e.to_string()))?;

        Ok(PathPattern::Dynamic(DynamicPattern {
            source: path.to_string(),
            regex,
            names,
        }))
    }

    /// The path as it was registered.
    pub fn source(&self) -> &str {
        match self {
            PathPattern::Exact(path) => path,
            PathPattern::Dynamic(pattern) => &pattern.source,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, PathPattern::Dynamic(_))
    }
}

impl DynamicPattern {
    /// The path as it was registered.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parameter names in segment order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Match `path` against the whole pattern and pair every captured
    /// segment with its parameter name.
    pub fn captures(&self, path: &str) -> Option<Parameters> {
        let captures = self.regex.captures(path)?;
        let parameters = self
            .names
            .iter()
            .zip(captures.iter().skip(1))
            .filter_map(|(name, value)| value.map(|m| (name.clone(), m.as_str().to_string())))
            .collect();
        Some(parameters)
    }
}
