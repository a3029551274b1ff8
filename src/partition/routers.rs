//! Parent router
//!
//! Turns parent records into child contexts.

use super::types::{Context, ParentLink};
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Derives child contexts from the records of a parent stream
#[derive(Debug, Clone)]
pub struct ParentRouter {
    /// Child stream name (for error reporting)
    child_stream: String,
    /// How the child hangs off its parent
    link: ParentLink,
}

impl ParentRouter {
    /// Create a router for one child stream
    pub fn new(child_stream: impl Into<String>, link: ParentLink) -> Self {
        Self {
            child_stream: child_stream.into(),
            link,
        }
    }

    /// Derive the context for one parent record.
    ///
    /// The parent key must be a number or a non-blank string; anything else
    /// means the upstream API changed shape and is reported as schema drift.
    pub fn derive_context(&self, parent_record: &Value) -> Result<Context> {
        match parent_record.get(self.link.parent_key) {
            Some(Value::String(s)) if s.trim().is_empty() => Err(Error::schema_drift(
                &self.child_stream,
                format!(
                    "parent '{}' record has a blank '{}'",
                    self.link.stream, self.link.parent_key
                ),
            )),
            Some(value @ (Value::Number(_) | Value::String(_))) => {
                Ok(Context::new().with(self.link.context_key, value.clone()))
            }
            Some(other) => Err(Error::schema_drift(
                &self.child_stream,
                format!(
                    "parent '{}' record has non-scalar '{}': {other}",
                    self.link.stream, self.link.parent_key
                ),
            )),
            None => Err(Error::schema_drift(
                &self.child_stream,
                format!(
                    "parent '{}' record has no '{}' field",
                    self.link.stream, self.link.parent_key
                ),
            )),
        }
    }

    /// Derive contexts for all parent records, in record order, skipping
    /// repeated parents
    pub fn contexts(&self, parent_records: &[Value]) -> Result<Vec<Context>> {
        let mut contexts = Vec::with_capacity(parent_records.len());
        let mut seen = HashSet::new();

        for record in parent_records {
            let context = self.derive_context(record)?;
            if seen.insert(context.id()) {
                contexts.push(context);
            } else {
                debug!(
                    stream = %self.child_stream,
                    context = %context.id(),
                    "Skipping repeated parent record"
                );
            }
        }

        Ok(contexts)
    }
}
