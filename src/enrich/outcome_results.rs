//! Outcome results joined with their linked metadata
//!
//! `GET /courses/:id/outcome_results?include[]=outcomes&include[]=alignments`
//! answers with
//!
//! ```json
//! {
//!   "outcome_results": [{"id": 1, "links": {"learning_outcome": "7", "alignment": "assignment_5"}}],
//!   "linked": {
//!     "outcomes": [{"id": 7, "title": "Critical Thinking", "display_name": "CT"}],
//!     "alignments": [{"id": "assignment_5", "name": "Essay 1"}]
//!   }
//! }
//! ```
//!
//! Each result is copied and extended with the matching outcome and
//! alignment fields. Link ids are emitted as strings, `outcome_id` as an
//! integer and `alignment_id` as a string, whichever form the response used.

use crate::error::{Error, Result};
use crate::types::{scalar_to_string, JsonObject};
use serde_json::Value;
use tracing::{debug, error};

const RESULTS_KEY: &str = "outcome_results";
const OUTCOME_LINK: &str = "learning_outcome";
const ALIGNMENT_LINK: &str = "alignment";

/// Fields added to each result
pub const ENRICHMENT_FIELDS: [&str; 5] = [
    "outcome_id",
    "outcome_title",
    "outcome_display_name",
    "alignment_id",
    "alignment_name",
];

/// Lazy iterator over enriched outcome results, in response order.
///
/// Borrows the response body; each item is an owned record or a schema
/// drift error for a result without its link fields.
#[derive(Debug)]
pub struct EnrichedRecords<'a> {
    stream: &'a str,
    results: std::slice::Iter<'a, Value>,
    outcomes: &'a [Value],
    alignments: &'a [Value],
    unresolved: usize,
}

impl<'a> EnrichedRecords<'a> {
    /// Number of outcome or alignment references that matched nothing so far
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    fn enrich_one(&mut self, result: &Value) -> Result<Value> {
        let Some(record) = result.as_object() else {
            return Err(Error::schema_drift(
                self.stream,
                format!("outcome result is not an object: {result}"),
            ));
        };

        let links = record.get("links").and_then(Value::as_object).ok_or_else(|| {
            Error::schema_drift(
                self.stream,
                format!("outcome result {} has no 'links' object", display_id(record)),
            )
        })?;

        let outcome_ref = link_value(self.stream, record, links, OUTCOME_LINK)?;
        let alignment_ref = link_value(self.stream, record, links, ALIGNMENT_LINK)?;

        let mut enriched = record.clone();
        enriched.insert("links".into(), Value::Object(links_as_strings(links)));

        match find_by_id(self.outcomes, outcome_ref) {
            Some(outcome) => {
                let id = outcome.get("id").and_then(integer_id).ok_or_else(|| {
                    Error::schema_drift(
                        self.stream,
                        format!(
                            "linked outcome for result {} has a non-integer id: {}",
                            display_id(record),
                            field(outcome, "id")
                        ),
                    )
                })?;
                enriched.insert("outcome_id".into(), id);
                enriched.insert("outcome_title".into(), field(outcome, "title"));
                enriched.insert("outcome_display_name".into(), field(outcome, "display_name"));
            }
            None => {
                self.unresolved += 1;
                error!(
                    stream = %self.stream,
                    result = %display_id(record),
                    reference = %outcome_ref,
                    "Unresolved learning outcome reference"
                );
                for key in ["outcome_id", "outcome_title", "outcome_display_name"] {
                    enriched.insert(key.into(), Value::Null);
                }
            }
        }

        match find_by_id(self.alignments, alignment_ref) {
            Some(alignment) => {
                let id = alignment.get("id").and_then(scalar_to_string);
                enriched.insert("alignment_id".into(), id.map_or(Value::Null, Value::String));
                enriched.insert("alignment_name".into(), field(alignment, "name"));
            }
            None => {
                self.unresolved += 1;
                error!(
                    stream = %self.stream,
                    result = %display_id(record),
                    reference = %alignment_ref,
                    "Unresolved alignment reference"
                );
                for key in ["alignment_id", "alignment_name"] {
                    enriched.insert(key.into(), Value::Null);
                }
            }
        }

        Ok(Value::Object(enriched))
    }
}

impl Iterator for EnrichedRecords<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.results.next()?;
        Some(self.enrich_one(result))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.results.size_hint()
    }
}

/// Start enriching one outcome results response.
///
/// Fails up front when the body has no `outcome_results` array. Missing
/// `linked` tables are treated as empty, so every reference into them
/// resolves to nulls.
pub fn enrich<'a>(stream: &'a str, body: &'a Value) -> Result<EnrichedRecords<'a>> {
    if let Some(map) = body.as_object() {
        debug!(
            stream = %stream,
            keys = ?map.keys().collect::<Vec<_>>(),
            "Outcome results response"
        );
    }

    let results = body
        .get(RESULTS_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            Error::schema_drift(stream, format!("response has no '{RESULTS_KEY}' array"))
        })?;

    let linked = body.get("linked");
    let outcomes = linked_table(stream, linked, "outcomes")?;
    let alignments = linked_table(stream, linked, "alignments")?;

    Ok(EnrichedRecords {
        stream,
        results: results.iter(),
        outcomes,
        alignments,
        unresolved: 0,
    })
}

fn linked_table<'a>(stream: &str, linked: Option<&'a Value>, name: &str) -> Result<&'a [Value]> {
    match linked.and_then(|l| l.get(name)) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(Error::schema_drift(
            stream,
            format!("'linked.{name}' is not an array: {other}"),
        )),
    }
}

fn link_value<'a>(
    stream: &str,
    record: &JsonObject,
    links: &'a JsonObject,
    key: &str,
) -> Result<&'a Value> {
    links.get(key).ok_or_else(|| {
        Error::schema_drift(
            stream,
            format!(
                "outcome result {} has no 'links.{key}' field",
                display_id(record)
            ),
        )
    })
}

/// First entry whose `id` has the same string form as `reference`
fn find_by_id<'a>(table: &'a [Value], reference: &Value) -> Option<&'a Value> {
    let wanted = scalar_to_string(reference)?;
    table
        .iter()
        .find(|entry| entry.get("id").and_then(scalar_to_string).as_deref() == Some(wanted.as_str()))
}

/// Link values in their string form. Canvas sends these ids as strings
/// or numbers depending on the endpoint version.
fn links_as_strings(links: &JsonObject) -> JsonObject {
    links
        .iter()
        .map(|(key, value)| {
            let value = scalar_to_string(value).map_or_else(|| value.clone(), Value::String);
            (key.clone(), value)
        })
        .collect()
}

/// An outcome id as a JSON integer, accepting numeric strings
fn integer_id(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn field(entry: &Value, key: &str) -> Value {
    entry.get(key).cloned().unwrap_or(Value::Null)
}

fn display_id(record: &JsonObject) -> String {
    record
        .get("id")
        .and_then(scalar_to_string)
        .unwrap_or_else(|| "<no id>".to_string())
}
