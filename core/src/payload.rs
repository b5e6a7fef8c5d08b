//! Payload - schema-less JSON object carried by tasks and results
//!
//! Task inputs and outputs are open-ended JSON objects. `Payload` wraps the
//! underlying map and adds typed accessors so resolvers can validate their
//! input without sprinkling `serde_json` pattern matching everywhere.

use crate::error::TaskError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object used as task input or output.
///
/// Serializes transparently as the object itself, so `{"a": 1}` round-trips
/// unchanged. The fallible `require_*` accessors return a [`TaskError`] with
/// the `ValidationError` type, which resolvers can surface as a permanent
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the payload contains the given field.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a field, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a field, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Raw access to a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a field as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Get a field as a signed integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Get a field as an unsigned integer.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    /// Get a field as a float. Integer values are widened.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Get a field as a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Get a field as a nested object.
    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Get a field as an array.
    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    /// Get a required string field or a `ValidationError`.
    pub fn require_str(&self, key: &str) -> Result<&str, TaskError> {
        self.get_str(key)
            .ok_or_else(|| Self::missing(key, "string"))
    }

    /// Get a required integer field or a `ValidationError`.
    pub fn require_i64(&self, key: &str) -> Result<i64, TaskError> {
        self.get_i64(key)
            .ok_or_else(|| Self::missing(key, "integer"))
    }

    /// Get a required float field or a `ValidationError`.
    pub fn require_f64(&self, key: &str) -> Result<f64, TaskError> {
        self.get_f64(key).ok_or_else(|| Self::missing(key, "number"))
    }

    /// Get a required boolean field or a `ValidationError`.
    pub fn require_bool(&self, key: &str) -> Result<bool, TaskError> {
        self.get_bool(key)
            .ok_or_else(|| Self::missing(key, "boolean"))
    }

    /// Iterate over the fields.
    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    /// Consume the payload, returning the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn missing(key: &str, expected: &str) -> TaskError {
        TaskError::validation(format!("missing or invalid field '{}': expected {}", key, expected))
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Payload> for Map<String, Value> {
    fn from(payload: Payload) -> Self {
        payload.0
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        Value::Object(payload.0)
    }
}

impl TryFrom<Value> for Payload {
    type Error = TaskError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TaskError::validation(format!(
                "payload must be a JSON object, got {}",
                type_name(&other)
            ))),
        }
    }
}

impl FromIterator<(String, Value)> for Payload {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(Map::from_iter(iter))
    }
}

impl IntoIterator for Payload {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Payload {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
