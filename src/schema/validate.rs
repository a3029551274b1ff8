//! Record validation against declared field tables

use super::types::{Field, FieldType, JsonSchema, INTEGER_MAX, INTEGER_MIN};
use crate::error::{Error, Result};
use crate::types::JsonObject;
use chrono::DateTime;
use serde_json::Value;
use tracing::trace;

/// Output schema of one stream: an ordered, static field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSchema {
    /// Declared fields, in output order
    pub fields: &'static [Field],
}

impl StreamSchema {
    /// Wrap a field table
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    /// Look up a declared top-level field
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a top-level field is declared
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// JSON Schema document, with the key properties marked required
    pub fn to_json_schema(&self, key_properties: &[&str]) -> JsonSchema {
        let mut schema = JsonSchema::from_fields(self.fields);
        for key in key_properties {
            schema.add_required(key);
        }
        schema
    }

    /// Conform a record to this schema.
    ///
    /// Declared fields are checked against their type and emitted in
    /// declaration order; undeclared properties are dropped. `null` is
    /// accepted for every field.
    pub fn conform(&self, stream: &str, record: &Value) -> Result<JsonObject> {
        match record {
            Value::Object(map) => conform_object(stream, "", self.fields, map),
            other => Err(Error::validation(
                stream,
                format!("expected a JSON object, got {}", value_kind(other)),
            )),
        }
    }
}

fn conform_object(
    stream: &str,
    prefix: &str,
    fields: &[Field],
    map: &JsonObject,
) -> Result<JsonObject> {
    let mut out = JsonObject::new();

    for field in fields {
        if let Some(value) = map.get(field.name) {
            let path = if prefix.is_empty() {
                field.name.to_string()
            } else {
                format!("{prefix}.{}", field.name)
            };
            out.insert(
                field.name.to_string(),
                conform_value(stream, &path, field.kind, value)?,
            );
        }
    }

    if map.len() > out.len() {
        for key in map.keys().filter(|k| !out.contains_key(k.as_str())) {
            trace!(stream, property = %key, "Dropping undeclared property");
        }
    }

    Ok(out)
}

fn conform_value(stream: &str, path: &str, kind: FieldType, value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let valid = match kind {
        FieldType::Integer => value
            .as_i64()
            .is_some_and(|n| (INTEGER_MIN..=INTEGER_MAX).contains(&n)),
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Timestamp => value
            .as_str()
            .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
        FieldType::Object(fields) => {
            return match value {
                Value::Object(map) => Ok(Value::Object(conform_object(stream, path, fields, map)?)),
                other => Err(mismatch(stream, path, kind, other)),
            };
        }
    };

    if valid {
        Ok(value.clone())
    } else {
        Err(mismatch(stream, path, kind, value))
    }
}

fn mismatch(stream: &str, path: &str, kind: FieldType, value: &Value) -> Error {
    Error::validation(
        stream,
        format!("field '{path}' expected {}, got {value}", kind.label()),
    )
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
