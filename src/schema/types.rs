//! Schema types
//!
//! Stream schemas are declared as static field tables ([`Field`]) and
//! rendered to JSON Schema documents ([`JsonSchema`]) for discovery.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lower bound of schema integers
pub const INTEGER_MIN: i64 = i32::MIN as i64;

/// Upper bound of schema integers
pub const INTEGER_MAX: i64 = i32::MAX as i64;

// ============================================================================
// Declared fields
// ============================================================================

/// Semantic type of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Integer bounded to the signed 32-bit range
    Integer,
    /// Any string
    String,
    /// Any JSON number
    Number,
    /// true / false
    Boolean,
    /// RFC 3339 date-time string
    Timestamp,
    /// Nested object with its own field table
    Object(&'static [Field]),
}

impl FieldType {
    /// Name used in validation messages
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "date-time string",
            FieldType::Object(_) => "object",
        }
    }
}

/// One declared field of a stream schema. All fields are nullable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Property name
    pub name: &'static str,
    /// Semantic type
    pub kind: FieldType,
    /// Optional description carried into the JSON Schema
    pub description: Option<&'static str>,
}

impl Field {
    /// Declare a field
    pub const fn new(name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            kind,
            description: None,
        }
    }

    /// Integer field
    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    /// String field
    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Number field
    pub const fn number(name: &'static str) -> Self {
        Self::new(name, FieldType::Number)
    }

    /// Boolean field
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Timestamp field
    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldType::Timestamp)
    }

    /// Nested object field
    pub const fn object(name: &'static str, fields: &'static [Field]) -> Self {
        Self::new(name, FieldType::Object(fields))
    }

    /// Attach a description
    #[must_use]
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

// ============================================================================
// JSON Schema documents
// ============================================================================

/// JSON Schema type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Null,
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Number => write!(f, "number"),
            JsonType::Integer => write!(f, "integer"),
            JsonType::Boolean => write!(f, "boolean"),
            JsonType::Object => write!(f, "object"),
            JsonType::Null => write!(f, "null"),
        }
    }
}

/// JSON Schema property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Property type(s); always `[type, "null"]` here
    #[serde(rename = "type")]
    pub json_type: Vec<JsonType>,

    /// Description (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Format hint (e.g., "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Inclusive lower bound (integers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,

    /// Inclusive upper bound (integers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,

    /// Nested properties (for objects)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaProperty>>,
}

impl SchemaProperty {
    /// Create a nullable property of the given type
    pub fn nullable(json_type: JsonType) -> Self {
        Self {
            json_type: vec![json_type, JsonType::Null],
            description: None,
            format: None,
            minimum: None,
            maximum: None,
            properties: None,
        }
    }

    /// Build the property for a declared field
    pub fn from_field(field: &Field) -> Self {
        let mut property = match field.kind {
            FieldType::Integer => {
                let mut p = Self::nullable(JsonType::Integer);
                p.minimum = Some(INTEGER_MIN);
                p.maximum = Some(INTEGER_MAX);
                p
            }
            FieldType::String => Self::nullable(JsonType::String),
            FieldType::Number => Self::nullable(JsonType::Number),
            FieldType::Boolean => Self::nullable(JsonType::Boolean),
            FieldType::Timestamp => {
                let mut p = Self::nullable(JsonType::String);
                p.format = Some("date-time".to_string());
                p
            }
            FieldType::Object(fields) => {
                let mut p = Self::nullable(JsonType::Object);
                p.properties = Some(properties_of(fields));
                p
            }
        };
        property.description = field.description.map(str::to_string);
        property
    }
}

/// Ordered JSON Schema properties for a field table
pub fn properties_of(fields: &[Field]) -> IndexMap<String, SchemaProperty> {
    fields
        .iter()
        .map(|f| (f.name.to_string(), SchemaProperty::from_field(f)))
        .collect()
}

/// Full JSON Schema document for one stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema type (always "object" for top-level)
    #[serde(rename = "type")]
    pub json_type: JsonType,

    /// Object properties, in declaration order
    #[serde(default)]
    pub properties: IndexMap<String, SchemaProperty>,

    /// Required properties (the stream's unique keys)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl JsonSchema {
    /// Build a document from a field table
    pub fn from_fields(fields: &[Field]) -> Self {
        Self {
            json_type: JsonType::Object,
            properties: properties_of(fields),
            required: Vec::new(),
        }
    }

    /// Add a required property
    pub fn add_required(&mut self, name: &str) {
        if !self.required.iter().any(|n| n == name) {
            self.required.push(name.to_string());
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
