//! Stream schemas
//!
//! Each stream declares its output schema as a static field table. The
//! table is rendered to JSON Schema for discovery and used to conform
//! every emitted record.
//!
//! # Features
//!
//! - **Static Declarations**: `const` field tables per stream
//! - **Bounded Integers**: integers are limited to the signed 32-bit range
//! - **Nested Objects**: object fields carry their own field table
//! - **Conforming**: undeclared properties are dropped, type mismatches fail

mod types;
mod validate;

pub use types::{
    properties_of, Field, FieldType, JsonSchema, JsonType, SchemaProperty, INTEGER_MAX,
    INTEGER_MIN,
};
pub use validate::StreamSchema;

#[cfg(test)]
mod tests;
