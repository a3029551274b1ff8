//! Stream definitions
//!
//! Every stream the tap can extract is declared statically in [`canvas`]
//! and collected into a [`StreamRegistry`].

pub mod canvas;
mod registry;
mod types;

pub use registry::StreamRegistry;
pub use types::{ConfigFilter, RecordExtraction, StreamDefinition};
