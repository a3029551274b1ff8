//! Output module
//!
//! Serializes engine messages as JSON lines.
//!
//! # Overview
//!
//! - [`MessageWriter`] implements the engine's message sink over any
//!   `io::Write`; the CLI points it at stdout.
//! - [`write_json_line`] writes one value per line for the `spec`,
//!   `discover` and `streams` commands.

mod writer;

pub use writer::{write_json_line, MessageWriter};
