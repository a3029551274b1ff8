//! Endpoint path templates
//!
//! Stream paths carry `{{ variable }}` placeholders, e.g.
//! `/accounts/{{ config.account_id }}/terms` or
//! `/courses/{{ context.course_id }}/enrollments`. Placeholders are filled
//! from the tap config and from the parent-record context.

use crate::error::{Error, Result};
use crate::partition::Context;
use crate::types::scalar_to_string;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Config values (`{{ config.account_id }}`)
    pub config: Value,
    /// Parent-record context (`{{ context.course_id }}`)
    pub context: Value,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with config values
    pub fn with_config(config: Value) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Copy of this template context scoped to one parent record
    #[must_use]
    pub fn scoped(&self, context: &Context) -> Self {
        Self {
            config: self.config.clone(),
            context: context.to_value(),
        }
    }

    /// Get a value by path (e.g., "config.account_id")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        let (root, rest) = parts.split_first()?;

        let root = match *root {
            "config" => &self.config,
            "context" => &self.context,
            _ => return None,
        };

        get_nested_value(root, rest)
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context.
///
/// Every placeholder must resolve to a scalar; anything else is an error so
/// a request never goes out with an empty path segment.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut errors = Vec::new();

    let rendered = TEMPLATE_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let var_path = &cap[1];
        match ctx.get(var_path).and_then(scalar_to_string) {
            Some(value) => value,
            None => {
                errors.push(var_path.to_string());
                String::new()
            }
        }
    });

    if errors.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}
