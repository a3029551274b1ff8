//! # tap-canvas
//!
//! Extracts Canvas LMS data (terms, courses, users, outcomes, enrollments,
//! sections, assignments and outcome results) and emits it as
//! schema-tagged JSON lines.
//!
//! ## Features
//!
//! - **Page Number Pagination**: `per_page=100`, `page` driven by `Link` headers
//! - **Parent-Child Streams**: course children are scoped per course id
//! - **Outcome Enrichment**: outcome results joined with linked outcomes and alignments
//! - **Static Schemas**: every record is conformed to its stream's declared schema
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_canvas::{config::TapConfig, engine::SyncEngine, output::MessageWriter};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> tap_canvas::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let mut engine = SyncEngine::from_config(config)?;
//!
//!     let mut writer = MessageWriter::new(std::io::stdout().lock());
//!     engine.sync(&["courses", "enrollments"], &mut writer).await?;
//!     writer.finish()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            SyncEngine                            │
//! │   registry order · parents before children · push to sink       │
//! └──────────────────────────────────────────────────────────────────┘
//!                                 │
//! ┌───────────┬───────────┬───────┴───────┬────────────┬────────────┐
//! │  Streams  │   HTTP    │   Paginate    │ Partition  │   Enrich   │
//! ├───────────┼───────────┼───────────────┼────────────┼────────────┤
//! │ Registry  │ Bearer    │ Page number   │ Parent id  │ Outcomes   │
//! │ Schemas   │ Retry     │ Link header   │ → context  │ Alignments │
//! │ Filters   │ Rate Limit│ Query params  │            │            │
//! └───────────┴───────────┴───────────────┴────────────┴────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration
pub mod config;

/// HTTP client with retry and rate limiting
pub mod http;

/// Path template interpolation
pub mod template;

/// Stream schemas
pub mod schema;

/// Stream definitions and registry
pub mod streams;

/// Query parameters and next-page decisions
pub mod pagination;

/// Parent-child context propagation
pub mod partition;

/// JSONPath record extraction
pub mod decode;

/// Outcome results enrichment
pub mod enrich;

/// Main execution engine
pub mod engine;

/// JSON lines output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::TapConfig;
pub use engine::{Message, MessageSink, SyncEngine, SyncStats};
pub use streams::{StreamDefinition, StreamRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
