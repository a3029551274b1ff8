//! Partition types
//!
//! Defines the context handed from a parent record to a child stream.

use crate::types::{scalar_to_string, JsonObject};
use serde_json::Value;

/// Request context derived from one parent record, e.g. `{course_id: 42}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: JsonObject,
}

impl Context {
    /// Create an empty context (used by root streams)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Iterate over the context entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Whether the context carries no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stable identity used for de-duplication and logging, e.g. `course_id=42`
    pub fn id(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{k}={}", scalar_to_string(v).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Context as a JSON object (for template rendering)
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

/// Static description of how a child stream hangs off its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    /// Name of the parent stream
    pub stream: &'static str,
    /// Field read from each parent record
    pub parent_key: &'static str,
    /// Key the value is stored under in the child context
    pub context_key: &'static str,
}

impl ParentLink {
    /// Create a parent link
    pub const fn new(
        stream: &'static str,
        parent_key: &'static str,
        context_key: &'static str,
    ) -> Self {
        Self {
            stream,
            parent_key,
            context_key,
        }
    }
}
