//! # Route Parameters
//!
//! Named path segment values (`user/:id` → `id = "42"`) and the typed
//! parameter contract a navigation target can declare.
//!
//! A target that declares `ParamType::Integer` only accepts
//! `ParamValue::Integer`. Values are never coerced: a `Text("42")` handed to
//! an integer target is rejected with `NavigationError::ParameterType`.
//! Raw segments and `RouteParameters` values must parse as the declared type.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::NavigationError;

/// Named route parameter values. Ordering of insertion is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteParameters {
    values: BTreeMap<String, String>,
}

impl RouteParameters {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn get_integer(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn get_long(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The parameter type a navigation target declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Text,
    Integer,
    Long,
    Boolean,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Text => "text",
            ParamType::Integer => "integer",
            ParamType::Long => "long",
            ParamType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

impl ParamType {
    /// True when a path segment reads as a value of this type.
    pub fn accepts(&self, segment: &str) -> bool {
        match self {
            ParamType::Text => true,
            ParamType::Integer => segment.parse::<i32>().is_ok(),
            ParamType::Long => segment.parse::<i64>().is_ok(),
            ParamType::Boolean => segment.parse::<bool>().is_ok(),
        }
    }
}

/// A route parameter value handed to a typed forward/reroute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(i32),
    Long(i64),
    Boolean(bool),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Text(_) => ParamType::Text,
            ParamValue::Integer(_) => ParamType::Integer,
            ParamValue::Long(_) => ParamType::Long,
            ParamValue::Boolean(_) => ParamType::Boolean,
        }
    }

    /// The value as it appears in a path segment.
    pub fn to_segment(&self) -> String {
        match self {
            ParamValue::Text(s) => s.clone(),
            ParamValue::Integer(i) => i.to_string(),
            ParamValue::Long(l) => l.to_string(),
            ParamValue::Boolean(b) => b.to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Long(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Boolean(value)
    }
}

/// Checks `value` against the type the target requires.
pub fn validate_parameter(value: &ParamValue, required: ParamType) -> Result<(), NavigationError> {
    let supplied = value.param_type();
    if supplied == required {
        return Ok(());
    }
    Err(NavigationError::ParameterType {
        value: value.to_segment(),
        supplied,
        required,
    })
}

/// Checks a raw segment (a URL piece or a `RouteParameters` value) against
/// the type the target requires.
pub fn validate_segment(segment: &str, required: ParamType) -> Result<(), NavigationError> {
    if required.accepts(segment) {
        return Ok(());
    }
    Err(NavigationError::ParameterType {
        value: segment.to_string(),
        supplied: ParamType::Text,
        required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = RouteParameters::from_pairs([("a", "1"), ("b", "2")]);
        let b = RouteParameters::from_pairs([("b", "2"), ("a", "1")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_typed_getters() {
        let params = RouteParameters::from_pairs([("id", "42"), ("flag", "true"), ("name", "x")]);
        assert_eq!(params.get_integer("id"), Some(42));
        assert_eq!(params.get_long("id"), Some(42));
        assert_eq!(params.get_bool("flag"), Some(true));
        assert_eq!(params.get_integer("name"), None);
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_empty_is_empty() {
        assert!(RouteParameters::empty().is_empty());
        assert_eq!(RouteParameters::empty(), RouteParameters::default());
    }

    #[test]
    fn test_validate_matching_type() {
        assert!(validate_parameter(&ParamValue::from(7), ParamType::Integer).is_ok());
        assert!(validate_parameter(&ParamValue::from("x"), ParamType::Text).is_ok());
    }

    #[test]
    fn test_validate_does_not_coerce_numeric_text() {
        let err = validate_parameter(&ParamValue::from("42"), ParamType::Integer).unwrap_err();
        assert_eq!(
            err,
            NavigationError::ParameterType {
                value: "42".to_string(),
                supplied: ParamType::Text,
                required: ParamType::Integer,
            }
        );
    }

    #[test]
    fn test_segment_acceptance_by_type() {
        assert!(ParamType::Integer.accepts("-12"));
        assert!(!ParamType::Integer.accepts("abc"));
        assert!(!ParamType::Integer.accepts("3000000000"));
        assert!(ParamType::Long.accepts("3000000000"));
        assert!(ParamType::Boolean.accepts("false"));
        assert!(!ParamType::Boolean.accepts("yes"));
        assert!(ParamType::Text.accepts("anything"));
    }

    #[test]
    fn test_validate_segment_rejects_unparseable() {
        assert!(validate_segment("42", ParamType::Integer).is_ok());
        let err = validate_segment("abc", ParamType::Integer).unwrap_err();
        assert_eq!(
            err,
            NavigationError::ParameterType {
                value: "abc".to_string(),
                supplied: ParamType::Text,
                required: ParamType::Integer,
            }
        );
    }

    #[test]
    fn test_segment_rendering() {
        assert_eq!(ParamValue::from(12i64).to_segment(), "12");
        assert_eq!(ParamValue::from(false).to_segment(), "false");
    }
}
