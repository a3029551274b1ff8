//! Engine types
//!
//! Output messages, the sink they are pushed to, and run statistics.

use crate::error::Result;
use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// A message emitted during sync.
///
/// Serializes to one line of the record-stream format:
/// `{"type":"SCHEMA",...}` or `{"type":"RECORD",...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message {
    /// Schema of a stream, sent before its records
    Schema {
        /// Stream name
        stream: String,
        /// JSON Schema document
        schema: Value,
        /// Unique-key fields
        key_properties: Vec<String>,
    },
    /// One conformed record
    Record {
        /// Stream name
        stream: String,
        /// Record body
        record: JsonObject,
        /// When the record was extracted
        time_extracted: DateTime<Utc>,
    },
}

impl Message {
    /// Create a schema message
    pub fn schema(stream: impl Into<String>, schema: Value, key_properties: &[&str]) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties: key_properties.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// Create a record message stamped with the current time
    pub fn record(stream: impl Into<String>, record: JsonObject) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted: Utc::now(),
        }
    }

    /// Stream the message belongs to
    pub fn stream(&self) -> &str {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => stream,
        }
    }

    /// Record body, for record messages
    pub fn as_record(&self) -> Option<&JsonObject> {
        match self {
            Self::Record { record, .. } => Some(record),
            Self::Schema { .. } => None,
        }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a schema message
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

/// Destination for emitted messages.
///
/// The engine pushes each message as soon as it is produced.
pub trait MessageSink {
    /// Accept one message
    fn emit(&mut self, message: Message) -> Result<()>;
}

impl MessageSink for Vec<Message> {
    fn emit(&mut self, message: Message) -> Result<()> {
        self.push(message);
        Ok(())
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records emitted
    pub records_synced: usize,
    /// Pages fetched, including pages of parents read only for context
    pub pages_fetched: usize,
    /// Selected streams completed
    pub streams_synced: usize,
    /// Outcome or alignment references that matched no linked entry
    pub unresolved_references: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records
    pub fn add_records(&mut self, count: usize) {
        self.records_synced += count;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Add unresolved references
    pub fn add_unresolved(&mut self, count: usize) {
        self.unresolved_references += count;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
