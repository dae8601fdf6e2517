//! # Locations
//!
//! Immutable value objects for "where the user asked to go":
//! a trimmed path split into segments, plus its query parameters.
//!
//! ```text
//! "/users/42/?tab=posts&tab=likes"
//!     path:     "users/42"
//!     segments: ["users", "42"]
//!     query:    { tab: ["posts", "likes"] }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Strips surrounding whitespace and slashes from a path.
pub fn trim_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

/// Query string parameters, each name mapped to one or more values.
///
/// Names are kept sorted so `query_string()` is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameters {
    parameters: BTreeMap<String, Vec<String>>,
}

impl QueryParameters {
    pub fn empty() -> Self {
        Self::default()
    }

    /// One value per name.
    pub fn simple<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let parameters = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), vec![v.into()]))
            .collect();
        Self { parameters }
    }

    pub fn full(parameters: BTreeMap<String, Vec<String>>) -> Self {
        Self { parameters }
    }

    /// Parses `a=1&a=2&flag`. A name without `=` gets a single empty value.
    /// Names and values are percent-decoded; undecodable input is kept as-is.
    pub fn parse(query: &str) -> Self {
        let mut parameters: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            parameters
                .entry(decode(name))
                .or_default()
                .push(decode(value));
        }
        Self { parameters }
    }

    pub fn parameters(&self) -> &BTreeMap<String, Vec<String>> {
        &self.parameters
    }

    /// All values for `name`; empty when the name is absent.
    pub fn get(&self, name: &str) -> &[String] {
        self.parameters.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value for `name`.
    pub fn get_single(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Encoded form without the leading `?`.
    pub fn query_string(&self) -> String {
        let mut parts = Vec::new();
        for (name, values) in &self.parameters {
            if values.is_empty() {
                parts.push(urlencoding::encode(name).into_owned());
            }
            for value in values {
                if value.is_empty() {
                    parts.push(urlencoding::encode(name).into_owned());
                } else {
                    parts.push(format!(
                        "{}={}",
                        urlencoding::encode(name),
                        urlencoding::encode(value)
                    ));
                }
            }
        }
        parts.join("&")
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// A requested location: trimmed path plus query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    path: String,
    segments: Vec<String>,
    query: QueryParameters,
}

impl Location {
    /// Parses `path?query`.
    pub fn new(location: &str) -> Self {
        match location.split_once('?') {
            Some((path, query)) => Self::with_query(path, QueryParameters::parse(query)),
            None => Self::with_query(location, QueryParameters::empty()),
        }
    }

    pub fn with_query(path: &str, query: QueryParameters) -> Self {
        let path = trim_path(path);
        let segments = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').map(str::to_string).collect()
        };
        Self {
            path,
            segments,
            query,
        }
    }

    /// The path without leading/trailing slashes; `""` for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn query_parameters(&self) -> &QueryParameters {
        &self.query
    }

    /// The path followed by `?query` when there is a query.
    pub fn path_with_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query.query_string())
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path_with_query())
    }
}
