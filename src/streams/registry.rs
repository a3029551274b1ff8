//! Stream registry
//!
//! Holds the stream definitions in run order and resolves stream
//! selections against them.

use super::canvas;
use super::types::StreamDefinition;
use crate::error::{Error, Result};
use crate::template::extract_variables;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Ordered set of stream definitions.
///
/// Construction guarantees unique names, that every parent is declared
/// before its children, and that a path only reads the context key its
/// parent provides.
#[derive(Debug, Clone)]
pub struct StreamRegistry {
    streams: Vec<StreamDefinition>,
}

impl StreamRegistry {
    /// Build a registry, validating names and parent links
    pub fn new(streams: Vec<StreamDefinition>) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::new();

        for stream in &streams {
            if let Some(link) = stream.parent {
                if !streams.iter().any(|s| s.name == link.stream) {
                    return Err(Error::registry(format!(
                        "stream '{}' references unknown parent '{}'",
                        stream.name, link.stream
                    )));
                }
                if !seen.contains(link.stream) {
                    return Err(Error::registry(format!(
                        "stream '{}' is declared before its parent '{}'",
                        stream.name, link.stream
                    )));
                }
            }
            check_path_variables(stream)?;
            if !seen.insert(stream.name) {
                return Err(Error::registry(format!(
                    "duplicate stream name '{}'",
                    stream.name
                )));
            }
        }

        Ok(Self { streams })
    }

    /// Registry of all Canvas streams
    pub fn canvas() -> Result<Self> {
        Self::new(canvas::all())
    }

    /// Look up a stream by name
    pub fn get(&self, name: &str) -> Result<&StreamDefinition> {
        self.streams
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::stream_not_found(name))
    }

    /// Stream names in run order
    pub fn names(&self) -> Vec<&'static str> {
        self.streams.iter().map(|s| s.name).collect()
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether the registry holds no streams
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Resolve a selection to definitions in run order.
    ///
    /// An empty selection selects every stream. Unknown names fail the whole
    /// selection.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&StreamDefinition>> {
        if names.is_empty() {
            return Ok(self.streams.iter().collect());
        }

        for name in names {
            self.get(name.as_ref())?;
        }

        Ok(self
            .streams
            .iter()
            .filter(|s| names.iter().any(|n| n.as_ref() == s.name))
            .collect())
    }

    /// Catalog document listing every stream with its schema and keys
    pub fn catalog(&self) -> Value {
        let streams: Vec<Value> = self
            .streams
            .iter()
            .map(|s| {
                json!({
                    "stream": s.name,
                    "tap_stream_id": s.name,
                    "schema": s.schema.to_json_schema(s.primary_keys).to_json(),
                    "key_properties": s.primary_keys,
                    "parent_stream": s.parent.map(|p| p.stream),
                })
            })
            .collect();

        json!({ "streams": streams })
    }
}

/// Every `{{ context.* }}` placeholder must name the parent's context key.
/// Root streams have no context.
fn check_path_variables(stream: &StreamDefinition) -> Result<()> {
    for variable in extract_variables(stream.path) {
        let Some(key) = variable.strip_prefix("context.") else {
            continue;
        };
        let reason = match stream.parent {
            Some(link) if link.context_key == key => continue,
            Some(link) => format!("its parent provides 'context.{}'", link.context_key),
            None => "it has no parent".to_string(),
        };
        return Err(Error::registry(format!(
            "path of stream '{}' uses '{variable}' but {reason}",
            stream.name
        )));
    }
    Ok(())
}
