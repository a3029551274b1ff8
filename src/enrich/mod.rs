//! Response enrichment
//!
//! Joins the outcome results of a page with the outcome and alignment
//! metadata sideloaded into the same response.

mod outcome_results;

pub use outcome_results::{enrich, EnrichedRecords, ENRICHMENT_FIELDS};
