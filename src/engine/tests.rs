//! Tests for engine module

use super::*;
use crate::streams::canvas::{COURSES, OUTCOME_RESULTS, SECTIONS, TERMS};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn engine_for(server: &MockServer) -> SyncEngine {
    let config = TapConfig::from_value(json!({
        "api_key": "test-token",
        "base_url": server.uri(),
        "max_retries": 0,
        "requests_per_second": 1000
    }))
    .unwrap();
    SyncEngine::from_config(config).unwrap()
}

fn records_of<'a>(messages: &'a [Message], stream: &str) -> Vec<&'a JsonObject> {
    messages
        .iter()
        .filter(|m| m.stream() == stream)
        .filter_map(Message::as_record)
        .collect()
}

// ============================================================================
// Message Tests
// ============================================================================

#[test]
fn test_schema_message_shape() {
    let value = serde_json::to_value(schema_message(&COURSES)).unwrap();

    assert_eq!(value["type"], "SCHEMA");
    assert_eq!(value["stream"], "courses");
    assert_eq!(value["key_properties"], json!(["id"]));
    assert_eq!(value["schema"]["type"], "object");
    assert_eq!(value["schema"]["required"], json!(["id"]));
}

#[test]
fn test_record_message_shape() {
    let record = json!({"id": 1, "name": "Biology"});
    let message = Message::record("courses", record.as_object().cloned().unwrap());
    let value = serde_json::to_value(&message).unwrap();

    assert_eq!(value["type"], "RECORD");
    assert_eq!(value["stream"], "courses");
    assert_eq!(value["record"], record);
    assert!(value["time_extracted"].is_string());
    assert!(message.is_record());
    assert!(!message.is_schema());
}

#[test]
fn test_vec_sink_collects() {
    let mut sink: Vec<Message> = Vec::new();
    sink.emit(schema_message(&TERMS)).unwrap();
    assert_eq!(sink.len(), 1);
    assert!(sink[0].is_schema());
}

#[test]
fn test_sync_stats() {
    let mut stats = SyncStats::new();
    stats.add_records(3);
    stats.add_page();
    stats.add_page();
    stats.add_stream();
    stats.add_unresolved(2);

    assert_eq!(stats.records_synced, 3);
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.streams_synced, 1);
    assert_eq!(stats.unresolved_references, 2);
}

// ============================================================================
// Record processing
// ============================================================================

#[test]
fn test_process_record_drops_undeclared() {
    let raw = json!({"id": 5, "name": "Period 1", "course_id": 42, "integration_id": "x"});
    let context = Context::new().with("course_id", json!(42));

    let record = process_record(&SECTIONS, &context, &raw).unwrap();

    assert_eq!(record.get("integration_id"), None);
    assert_eq!(record["name"], "Period 1");
}

#[test]
fn test_context_injected_when_declared_and_absent() {
    let raw = json!({"id": 1, "links": {"learning_outcome": "7", "alignment": "a"}});
    let context = Context::new().with("course_id", json!(42));

    let record = process_record(&OUTCOME_RESULTS, &context, &raw).unwrap();

    assert_eq!(record["course_id"], json!(42));
}

#[test]
fn test_context_does_not_override_record() {
    let raw = json!({"id": 1, "course_id": 43});
    let context = Context::new().with("course_id", json!(42));

    let record = process_record(&SECTIONS, &context, &raw).unwrap();

    assert_eq!(record["course_id"], json!(43));
}

#[test]
fn test_context_not_injected_when_undeclared() {
    let raw = json!({"id": 10});
    let context = Context::new().with("course_id", json!(42));

    let record = process_record(&TERMS, &context, &raw).unwrap();

    assert_eq!(record.get("course_id"), None);
}

#[test]
fn test_missing_unique_key_is_drift() {
    let err = process_record(&COURSES, &Context::new(), &json!({"name": "No id"})).unwrap_err();
    assert!(err.is_schema_drift());
    assert!(err.to_string().contains("unique key 'id'"));
}

#[test]
fn test_null_unique_key_is_drift() {
    let err = process_record(&COURSES, &Context::new(), &json!({"id": null})).unwrap_err();
    assert!(err.is_schema_drift());
}

#[test]
fn test_type_mismatch_is_validation_error() {
    let err = process_record(&COURSES, &Context::new(), &json!({"id": "abc"})).unwrap_err();
    assert!(matches!(err, Error::SchemaValidation { .. }));
}

// ============================================================================
// Sync runs
// ============================================================================

#[tokio::test]
async fn test_sync_root_stream_two_pages() {
    let server = MockServer::start().await;
    let full_page: Vec<_> = (1..=100).map(|i| json!({"id": i})).collect();

    Mock::given(method("GET"))
        .and(path("/accounts/1/users"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_page))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 101}])))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = engine_for(&server).await;
    let mut messages: Vec<Message> = Vec::new();
    let stats = engine.sync(&["users"], &mut messages).await.unwrap();

    assert!(messages[0].is_schema());
    assert_eq!(records_of(&messages, "users").len(), 101);
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.records_synced, 101);
    assert_eq!(stats.streams_synced, 1);
}

#[tokio::test]
async fn test_sync_wrapped_terms() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/terms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enrollment_terms": [
                {"id": 1, "name": "Fall 2024", "start_at": "2024-09-01T00:00:00Z"},
                {"id": 2, "name": "Spring 2025", "start_at": null}
            ]
        })))
        .mount(&server)
        .await;

    let mut engine = engine_for(&server).await;
    let mut messages: Vec<Message> = Vec::new();
    engine.sync(&["terms"], &mut messages).await.unwrap();

    let terms = records_of(&messages, "terms");
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0]["name"], "Fall 2024");
}

#[tokio::test]
async fn test_unselected_parent_read_silently() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/courses"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 42}, {"id": 43}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    for course in [42, 43] {
        Mock::given(method("GET"))
            .and(path(format!("/courses/{course}/sections")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": course * 10, "course_id": course}])),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut engine = engine_for(&server).await;
    let mut messages: Vec<Message> = Vec::new();
    let stats = engine.sync(&["sections"], &mut messages).await.unwrap();

    assert!(messages.iter().all(|m| m.stream() == "sections"));
    let sections = records_of(&messages, "sections");
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["id"], json!(420));
    assert_eq!(sections[1]["id"], json!(430));
    assert_eq!(stats.records_synced, 2);
    assert_eq!(stats.pages_fetched, 3);
}

#[tokio::test]
async fn test_outcome_results_enriched_and_counted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 42}])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/courses/42/outcome_results"))
        .and(query_param("include[]", "outcomes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "outcome_results": [
                {"id": 1, "score": 3, "links": {"learning_outcome": "7", "alignment": "assignment_5"}},
                {"id": 2, "score": 1, "links": {"learning_outcome": "99", "alignment": "assignment_5"}}
            ],
            "linked": {
                "outcomes": [{"id": 7, "title": "Critical Thinking", "display_name": "CT"}],
                "alignments": [{"id": "assignment_5", "name": "Essay 1"}]
            }
        })))
        .mount(&server)
        .await;

    let mut engine = engine_for(&server).await;
    let mut messages: Vec<Message> = Vec::new();
    let stats = engine
        .sync(&["outcome_results"], &mut messages)
        .await
        .unwrap();

    let results = records_of(&messages, "outcome_results");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["course_id"], json!(42));
    assert_eq!(results[0]["outcome_id"], json!(7));
    assert_eq!(results[0]["outcome_title"], "Critical Thinking");
    assert_eq!(results[0]["alignment_name"], "Essay 1");
    assert_eq!(results[1]["outcome_title"], Value::Null);
    assert_eq!(stats.unresolved_references, 1);
}

async fn sync_outcome_results(body: Value) -> Result<(Vec<Message>, SyncStats)> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 42}])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/courses/42/outcome_results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let mut engine = engine_for(&server).await;
    let mut messages: Vec<Message> = Vec::new();
    let stats = engine.sync(&["outcome_results"], &mut messages).await?;
    Ok((messages, stats))
}

#[tokio::test]
async fn test_numeric_links_pass_schema() {
    let (messages, stats) = sync_outcome_results(json!({
        "outcome_results": [
            {"id": 1, "links": {"user": 100, "learning_outcome": 7, "alignment": "assignment_5"}}
        ],
        "linked": {
            "outcomes": [{"id": 7, "title": "Critical Thinking", "display_name": "CT"}],
            "alignments": [{"id": "assignment_5", "name": "Essay 1"}]
        }
    }))
    .await
    .unwrap();

    let results = records_of(&messages, "outcome_results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["outcome_id"], json!(7));
    assert_eq!(results[0]["outcome_title"], "Critical Thinking");
    assert_eq!(results[0]["links"]["learning_outcome"], "7");
    assert_eq!(results[0]["links"]["user"], "100");
    assert_eq!(stats.unresolved_references, 0);
}

#[tokio::test]
async fn test_string_linked_ids_pass_schema() {
    let (messages, _) = sync_outcome_results(json!({
        "outcome_results": [
            {"id": 1, "links": {"learning_outcome": "7", "alignment": "55"}}
        ],
        "linked": {
            "outcomes": [{"id": "7", "title": "Critical Thinking", "display_name": "CT"}],
            "alignments": [{"id": 55, "name": "Quiz 1"}]
        }
    }))
    .await
    .unwrap();

    let results = records_of(&messages, "outcome_results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["outcome_id"], json!(7));
    assert_eq!(results[0]["alignment_id"], "55");
    assert_eq!(results[0]["alignment_name"], "Quiz 1");
}

#[tokio::test]
async fn test_blank_parent_id_stops_before_child_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": ""}])))
        .mount(&server)
        .await;

    let mut engine = engine_for(&server).await;
    let mut messages: Vec<Message> = Vec::new();
    let err = engine.sync(&["enrollments"], &mut messages).await.unwrap_err();

    assert!(err.is_schema_drift());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/accounts/1/courses");
}

#[tokio::test]
async fn test_http_error_aborts_after_emitted_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/terms"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"enrollment_terms": [{"id": 1}]})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/courses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid access token"))
        .mount(&server)
        .await;

    let mut engine = engine_for(&server).await;
    let mut messages: Vec<Message> = Vec::new();
    let err = engine
        .sync(&["terms", "courses"], &mut messages)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 401, .. }));
    assert_eq!(records_of(&messages, "terms").len(), 1);
}

#[tokio::test]
async fn test_check_reads_account() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Root"})))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    engine.check().await.unwrap();
}
