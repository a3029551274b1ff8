//! Response decoding
//!
//! Canvas list endpoints answer with JSON. Records are pulled out of the
//! parsed body with a JSONPath pointer, e.g. `$[*]` for a bare array or
//! `$.enrollment_terms[*]` for a wrapped one.

mod decoders;

pub use decoders::{extract_with_jsonpath, JsonDecoder};
