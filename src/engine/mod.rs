//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Runs the selected streams in registry order
//! - `MessageSink` - Receives schema and record messages as they are produced
//! - `SyncStats` - Counters for a run
//!
//! Child streams are scoped by contexts derived from their parent's records.
//! A parent is always read in full before its first child request. When a
//! parent is not selected it is still read, without emitting anything, to
//! collect those contexts.

mod types;

pub use types::{Message, MessageSink, SyncStats};

use crate::config::TapConfig;
use crate::decode::JsonDecoder;
use crate::enrich;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{build_params, PageNumberPaginator, PageToken, Paginator};
use crate::partition::{Context, ParentRouter};
use crate::streams::{RecordExtraction, StreamDefinition, StreamRegistry};
use crate::template::{self, TemplateContext};
use crate::types::JsonObject;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, trace};

/// Conformed records of parent streams, keyed by stream name
type ParentRecords = HashMap<&'static str, Vec<Value>>;

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// HTTP client
    client: HttpClient,
    /// Validated tap config
    config: TapConfig,
    /// Streams the engine can run
    registry: StreamRegistry,
    /// Next-page decisions
    paginator: PageNumberPaginator,
    /// Template values shared by every request
    templates: TemplateContext,
    /// Statistics
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: HttpClient, config: TapConfig, registry: StreamRegistry) -> Self {
        let templates = TemplateContext::with_config(config.template_values());
        Self {
            client,
            config,
            registry,
            paginator: PageNumberPaginator::new(),
            templates,
            stats: SyncStats::default(),
        }
    }

    /// Engine over every Canvas stream, with an HTTP client built from the
    /// config
    pub fn from_config(config: TapConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::with_config(config.http_client_config())?;
        Ok(Self::new(client, config, StreamRegistry::canvas()?))
    }

    /// Stream registry
    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Verify the API is reachable with the configured token by reading the
    /// configured account
    pub async fn check(&self) -> Result<()> {
        let path = template::render("/accounts/{{ config.account_id }}", &self.templates)?;
        let response = self
            .client
            .get_json_response(&path, RequestConfig::new())
            .await?;
        debug!(status = %response.status, "Connection check succeeded");
        Ok(())
    }

    /// Run the selected streams (all when `selection` is empty) and push
    /// their messages to `sink`.
    ///
    /// The first error aborts the run. Messages already pushed stay pushed.
    pub async fn sync<S: AsRef<str>>(
        &mut self,
        selection: &[S],
        sink: &mut dyn MessageSink,
    ) -> Result<SyncStats> {
        let start = Instant::now();

        let selected: Vec<StreamDefinition> = self
            .registry
            .select(selection)?
            .into_iter()
            .copied()
            .collect();

        let needed_parents: HashSet<&'static str> = selected
            .iter()
            .filter_map(|s| s.parent.map(|p| p.stream))
            .collect();

        let mut parents = ParentRecords::new();

        for stream in &selected {
            self.read_missing_parents(stream, &mut parents).await?;
            let contexts = derive_contexts(stream, &parents)?;

            let keep = needed_parents.contains(stream.name);
            let records = self
                .sync_stream(stream, &contexts, Some(&mut *sink), keep)
                .await?;

            if keep {
                parents.insert(stream.name, records);
            }
            self.stats.add_stream();
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            streams = self.stats.streams_synced,
            records = self.stats.records_synced,
            pages = self.stats.pages_fetched,
            unresolved = self.stats.unresolved_references,
            "Sync completed"
        );

        Ok(self.stats.clone())
    }

    /// Read, without emitting, every unselected ancestor of `stream` whose
    /// records are not yet known
    async fn read_missing_parents(
        &mut self,
        stream: &StreamDefinition,
        parents: &mut ParentRecords,
    ) -> Result<()> {
        let mut chain = Vec::new();
        let mut next = stream.parent;

        while let Some(link) = next {
            if parents.contains_key(link.stream) {
                break;
            }
            let ancestor = *self.registry.get(link.stream)?;
            chain.push(ancestor);
            next = ancestor.parent;
        }

        for ancestor in chain.into_iter().rev() {
            info!(
                stream = %ancestor.name,
                child = %stream.name,
                "Reading unselected parent stream for context"
            );
            let contexts = derive_contexts(&ancestor, parents)?;
            let records = self.sync_stream(&ancestor, &contexts, None, true).await?;
            parents.insert(ancestor.name, records);
        }

        Ok(())
    }

    /// Read one stream across all its contexts.
    ///
    /// With a sink, the schema message is pushed first and every record as
    /// soon as it is conformed. Returns the conformed records when
    /// `keep_records` is set.
    pub async fn sync_stream(
        &mut self,
        stream: &StreamDefinition,
        contexts: &[Context],
        mut sink: Option<&mut dyn MessageSink>,
        keep_records: bool,
    ) -> Result<Vec<Value>> {
        let start = Instant::now();
        let mut kept = Vec::new();
        let mut emitted = 0usize;

        info!(stream = %stream.name, contexts = contexts.len(), "Starting stream");

        if let Some(sink) = sink.as_deref_mut() {
            sink.emit(schema_message(stream))?;
        }

        for context in contexts {
            let request_ctx = self.templates.scoped(context);
            let path = template::render(stream.path, &request_ctx)?;
            let mut token: Option<PageToken> = None;

            loop {
                let params = build_params(token, stream, &self.config);
                debug!(
                    stream = %stream.name,
                    context = %context.id(),
                    page = %token.map_or(1, PageToken::page),
                    "Requesting {path}"
                );

                let request = RequestConfig::new().query_pairs(params.into_vec());
                let response = self.client.get_json_response(&path, request).await?;
                self.stats.add_page();

                let mut page_records = 0usize;
                let mut on_record = |raw: Value| -> Result<()> {
                    page_records += 1;
                    let record = process_record(stream, context, &raw)?;
                    if keep_records {
                        kept.push(Value::Object(record.clone()));
                    }
                    if let Some(sink) = sink.as_deref_mut() {
                        sink.emit(Message::record(stream.name, record))?;
                        emitted += 1;
                    }
                    Ok(())
                };

                match stream.extraction {
                    RecordExtraction::JsonPath(pointer) => {
                        let decoder = JsonDecoder::with_path(pointer);
                        for raw in decoder.extract(stream.name, &response.body)? {
                            on_record(raw)?;
                        }
                    }
                    RecordExtraction::OutcomeResults => {
                        let mut results = enrich::enrich(stream.name, &response.body)?;
                        for raw in results.by_ref() {
                            on_record(raw?)?;
                        }
                        self.stats.add_unresolved(results.unresolved());
                    }
                }

                token = self
                    .paginator
                    .next_page_token(token, &response.headers, page_records);
                if token.is_none() {
                    break;
                }
            }
        }

        self.stats.add_records(emitted);
        let records = if sink.is_some() { emitted } else { kept.len() };
        info!(
            stream = %stream.name,
            records,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completed stream"
        );

        Ok(kept)
    }
}

/// Contexts a stream runs under: one empty context for root streams, one per
/// distinct parent record for children
fn derive_contexts(stream: &StreamDefinition, parents: &ParentRecords) -> Result<Vec<Context>> {
    match stream.parent {
        None => Ok(vec![Context::new()]),
        Some(link) => {
            let records = parents.get(link.stream).ok_or_else(|| {
                Error::registry(format!(
                    "parent '{}' of '{}' has not been read",
                    link.stream, stream.name
                ))
            })?;
            ParentRouter::new(stream.name, link).contexts(records)
        }
    }
}

/// Inject context values, conform to the schema and check unique keys
fn process_record(stream: &StreamDefinition, context: &Context, raw: &Value) -> Result<JsonObject> {
    let record = inject_context(stream, context, raw);
    let conformed = stream.schema.conform(stream.name, &record)?;

    for key in stream.primary_keys {
        if conformed.get(*key).map_or(true, Value::is_null) {
            return Err(Error::schema_drift(
                stream.name,
                format!("record has no value for unique key '{key}'"),
            ));
        }
    }

    Ok(conformed)
}

/// Copy context values the schema declares into a record lacking them
fn inject_context(stream: &StreamDefinition, context: &Context, raw: &Value) -> Value {
    let Value::Object(map) = raw else {
        return raw.clone();
    };

    let mut record = map.clone();
    for (key, value) in context.iter() {
        if stream.schema.has_field(key) && !record.contains_key(key) {
            trace!(stream = %stream.name, key = %key, "Injecting context value");
            record.insert(key.clone(), value.clone());
        }
    }
    Value::Object(record)
}

/// Schema message for a stream
pub fn schema_message(stream: &StreamDefinition) -> Message {
    let schema = stream.schema.to_json_schema(stream.primary_keys).to_json();
    Message::schema(stream.name, schema, stream.primary_keys)
}

#[cfg(test)]
mod tests;
