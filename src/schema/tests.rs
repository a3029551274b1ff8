//! Tests for schema module

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

const GRADES: &[Field] = &[Field::number("current_score"), Field::string("current_grade")];

const FIELDS: &[Field] = &[
    Field::integer("id").describe("Enrollment ID"),
    Field::string("type"),
    Field::number("score"),
    Field::boolean("active"),
    Field::timestamp("created_at"),
    Field::object("grades", GRADES),
];

const SCHEMA: StreamSchema = StreamSchema::new(FIELDS);

// ============================================================================
// JSON Schema rendering
// ============================================================================

#[test]
fn test_json_schema_keeps_declaration_order() {
    let schema = SCHEMA.to_json_schema(&["id"]);
    let names: Vec<_> = schema.properties.keys().cloned().collect();

    assert_eq!(
        names,
        vec!["id", "type", "score", "active", "created_at", "grades"]
    );
    assert_eq!(schema.required, vec!["id".to_string()]);
}

#[test]
fn test_json_schema_integer_bounds() {
    let schema = SCHEMA.to_json_schema(&[]);
    let id = &schema.properties["id"];

    assert_eq!(id.json_type, vec![JsonType::Integer, JsonType::Null]);
    assert_eq!(id.minimum, Some(-2_147_483_648));
    assert_eq!(id.maximum, Some(2_147_483_647));
    assert_eq!(id.description.as_deref(), Some("Enrollment ID"));
}

#[test]
fn test_json_schema_serialization() {
    let value = SCHEMA.to_json_schema(&["id"]).to_json();

    assert_eq!(value["type"], "object");
    assert_eq!(value["properties"]["created_at"]["format"], "date-time");
    assert_eq!(value["properties"]["created_at"]["type"], json!(["string", "null"]));
    assert_eq!(
        value["properties"]["grades"]["properties"]["current_score"]["type"],
        json!(["number", "null"])
    );
    assert_eq!(value["required"], json!(["id"]));
}

#[test]
fn test_all_properties_nullable() {
    let schema = SCHEMA.to_json_schema(&[]);
    assert!(schema
        .properties
        .values()
        .all(|p| p.json_type.contains(&JsonType::Null)));
}

#[test]
fn test_field_lookup() {
    assert!(SCHEMA.has_field("grades"));
    assert!(!SCHEMA.has_field("current_score"));
    assert_eq!(SCHEMA.field("score").map(|f| f.kind), Some(FieldType::Number));
}

// ============================================================================
// Conforming records
// ============================================================================

#[test]
fn test_conform_valid_record() {
    let record = json!({
        "created_at": "2024-01-15T10:00:00Z",
        "id": 7,
        "type": "StudentEnrollment",
        "score": 91.5,
        "active": true,
        "grades": {"current_score": 91.5, "current_grade": "A-", "html_url": "x"}
    });

    let conformed = SCHEMA.conform("enrollments", &record).unwrap();

    assert_eq!(
        conformed.keys().collect::<Vec<_>>(),
        vec!["id", "type", "score", "active", "created_at", "grades"]
    );
    assert_eq!(
        conformed["grades"],
        json!({"current_score": 91.5, "current_grade": "A-"})
    );
}

#[test]
fn test_conform_drops_undeclared() {
    let record = json!({"id": 1, "html_url": "https://x", "sis_import_id": 3});
    let conformed = SCHEMA.conform("enrollments", &record).unwrap();
    assert_eq!(serde_json::Value::Object(conformed), json!({"id": 1}));
}

#[test]
fn test_conform_accepts_nulls() {
    let record = json!({"id": null, "created_at": null, "grades": null});
    let conformed = SCHEMA.conform("enrollments", &record).unwrap();
    assert!(conformed.values().all(serde_json::Value::is_null));
}

#[test_case(json!({"id": 2_147_483_648_i64}) ; "integer above range")]
#[test_case(json!({"id": -2_147_483_649_i64}) ; "integer below range")]
#[test_case(json!({"id": 1.5}) ; "fractional integer")]
#[test_case(json!({"id": "7"}) ; "string integer")]
#[test_case(json!({"type": 3}) ; "number as string")]
#[test_case(json!({"score": "91"}) ; "string as number")]
#[test_case(json!({"active": "yes"}) ; "string as boolean")]
#[test_case(json!({"created_at": "yesterday"}) ; "unparseable timestamp")]
#[test_case(json!({"grades": [1, 2]}) ; "array as object")]
#[test_case(json!({"grades": {"current_score": "high"}}) ; "nested mismatch")]
fn test_conform_rejects(record: serde_json::Value) {
    let err = SCHEMA.conform("enrollments", &record).unwrap_err();
    assert!(matches!(err, Error::SchemaValidation { ref stream, .. } if stream == "enrollments"));
}

#[test]
fn test_conform_nested_error_path() {
    let record = json!({"grades": {"current_score": "high"}});
    let err = SCHEMA.conform("enrollments", &record).unwrap_err();
    assert!(err.to_string().contains("grades.current_score"));
}

#[test]
fn test_conform_rejects_non_object() {
    let err = SCHEMA.conform("terms", &json!([1, 2])).unwrap_err();
    assert!(err.to_string().contains("expected a JSON object, got array"));
}

#[test]
fn test_integer_bounds_inclusive() {
    let record = json!({"id": 2_147_483_647});
    assert!(SCHEMA.conform("enrollments", &record).is_ok());
    let record = json!({"id": -2_147_483_648_i64});
    assert!(SCHEMA.conform("enrollments", &record).is_ok());
}
