//! JSONPath record extraction

use crate::error::{Error, Result};
use serde_json::Value;

/// Extracts records from a parsed response body with a JSONPath pointer
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    /// JSONPath to extract records
    record_path: String,
}

impl JsonDecoder {
    /// Decoder with a record path, e.g. `$.enrollment_terms[*]`
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            record_path: path.into(),
        }
    }

    /// Extract records from a parsed body.
    ///
    /// A body whose top-level shape contradicts the path (an object where
    /// the path indexes an array, or the reverse) is schema drift. A path
    /// that matches nothing yields no records.
    pub fn extract(&self, stream: &str, body: &Value) -> Result<Vec<Value>> {
        check_root_shape(stream, &self.record_path, body)?;
        extract_with_jsonpath(body, &self.record_path)
    }
}

fn check_root_shape(stream: &str, path: &str, body: &Value) -> Result<()> {
    let rest = path.strip_prefix('$').unwrap_or(path);

    let expected = if rest.starts_with('[') {
        "array"
    } else if rest.starts_with('.') {
        "object"
    } else {
        return Ok(());
    };

    let actual = match body {
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    };

    if expected == actual {
        Ok(())
    } else {
        Err(Error::schema_drift(
            stream,
            format!("expected a top-level {expected} for '{path}', got {actual}"),
        ))
    }
}

/// Run a JSONPath query, flattening the match set into records
pub fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
