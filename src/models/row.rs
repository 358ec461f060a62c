//! Raw tabular rows and the central default-on-missing parsing policy.
//!
//! The backing store guarantees neither field presence nor field types:
//! a numeric column may arrive as a JSON number or as a string, flags
//! may be booleans or `"TRUE"`-style markers, and whole columns may be
//! absent on older rows. Every accessor here degrades gracefully
//! (empty string / zero / `false`) so that entity constructors never
//! have to re-implement that policy at individual call sites.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single untyped record from a spreadsheet collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Creates an empty row.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the row for chaining.
    #[inline]
    #[must_use]
    pub fn with<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        let _prev = self.0.insert(name.to_owned(), value.into());
        self
    }

    /// Returns a string field, trimmed; empty when absent or not
    /// representable as text.
    #[must_use]
    pub fn str_field(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(Value::String(text)) => text.trim().to_owned(),
            Some(Value::Number(num)) => num.to_string(),
            Some(Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_)) | None => {
                String::new()
            }
        }
    }

    /// Returns a string field, or `None` when absent or blank.
    #[must_use]
    pub fn opt_str_field(&self, name: &str) -> Option<String> {
        let text = self.str_field(name);
        if text.is_empty() { None } else { Some(text) }
    }

    /// Returns a numeric field; string values are coerced, anything
    /// unparseable defaults to `0`.
    #[must_use]
    pub fn num_field(&self, name: &str) -> f64 {
        match self.0.get(name) {
            Some(Value::Number(num)) => num.as_f64().unwrap_or(0.0),
            Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
            Some(Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_)) | None => 0.0,
        }
    }

    /// Returns an integer field; string values are coerced, anything
    /// unparseable defaults to `0`.
    #[must_use]
    pub fn int_field(&self, name: &str) -> i64 {
        match self.0.get(name) {
            Some(Value::Number(num)) => num.as_i64().unwrap_or(0),
            Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
            Some(Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_)) | None => 0,
        }
    }

    /// Returns a flag field; accepts booleans, the spreadsheet-style
    /// `"TRUE"` / `"yes"` / `"1"` markers, and nonzero numbers.
    #[must_use]
    pub fn bool_field(&self, name: &str) -> bool {
        match self.0.get(name) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => {
                let lower = text.trim().to_lowercase();
                lower == "true" || lower == "yes" || lower == "1"
            }
            Some(Value::Number(num)) => num.as_f64().is_some_and(|n| n.abs() > f64::EPSILON),
            Some(Value::Null | Value::Array(_) | Value::Object(_)) | None => false,
        }
    }
}

impl From<Map<String, Value>> for Row {
    #[inline]
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
