//! Stream definition types

use crate::config::TapConfig;
use crate::partition::ParentLink;
use crate::schema::StreamSchema;

/// How records are pulled out of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordExtraction {
    /// JSONPath pointer, e.g. `$[*]` or `$.enrollment_terms[*]`
    JsonPath(&'static str),
    /// Outcome results joined with their linked outcomes and alignments
    OutcomeResults,
}

/// Optional request filter driven by a config key.
///
/// A filter is sent only when its config key is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFilter {
    /// `course_ends_after` → `ends_after`
    CourseEndsAfter,
    /// `with_enrollments` → `with_enrollments`
    WithEnrollments,
}

impl ConfigFilter {
    /// Query parameter name
    pub fn param(self) -> &'static str {
        match self {
            ConfigFilter::CourseEndsAfter => "ends_after",
            ConfigFilter::WithEnrollments => "with_enrollments",
        }
    }

    /// Query value, or `None` when the config key is absent
    pub fn value(self, config: &TapConfig) -> Option<String> {
        match self {
            ConfigFilter::CourseEndsAfter => config.course_ends_after.clone(),
            ConfigFilter::WithEnrollments => config.with_enrollments.map(|b| b.to_string()),
        }
    }
}

/// Static description of one stream. Immutable after construction.
#[derive(Debug, Clone, Copy)]
pub struct StreamDefinition {
    /// Stream name, e.g. `courses`
    pub name: &'static str,
    /// Endpoint path template
    pub path: &'static str,
    /// Unique-key fields
    pub primary_keys: &'static [&'static str],
    /// Field to order results by (sends `sort=asc&order_by=<field>`)
    pub order_by: Option<&'static str>,
    /// Parent stream, for nested resources
    pub parent: Option<ParentLink>,
    /// Config-driven request filters
    pub filters: &'static [ConfigFilter],
    /// Fixed query parameters sent on every request
    pub extra_params: &'static [(&'static str, &'static str)],
    /// Response-to-records rule
    pub extraction: RecordExtraction,
    /// Output schema
    pub schema: StreamSchema,
}

impl StreamDefinition {
    /// Define a root stream whose records are the top-level array
    pub const fn new(name: &'static str, path: &'static str, schema: StreamSchema) -> Self {
        Self {
            name,
            path,
            primary_keys: &["id"],
            order_by: None,
            parent: None,
            filters: &[],
            extra_params: &[],
            extraction: RecordExtraction::JsonPath("$[*]"),
            schema,
        }
    }

    /// Set unique-key fields
    #[must_use]
    pub const fn primary_keys(mut self, keys: &'static [&'static str]) -> Self {
        self.primary_keys = keys;
        self
    }

    /// Order results ascending by a field
    #[must_use]
    pub const fn order_by(mut self, field: &'static str) -> Self {
        self.order_by = Some(field);
        self
    }

    /// Nest under a parent stream
    #[must_use]
    pub const fn child_of(mut self, parent: ParentLink) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set config-driven filters
    #[must_use]
    pub const fn filters(mut self, filters: &'static [ConfigFilter]) -> Self {
        self.filters = filters;
        self
    }

    /// Set fixed query parameters
    #[must_use]
    pub const fn extra_params(mut self, params: &'static [(&'static str, &'static str)]) -> Self {
        self.extra_params = params;
        self
    }

    /// Set the extraction rule
    #[must_use]
    pub const fn extraction(mut self, extraction: RecordExtraction) -> Self {
        self.extraction = extraction;
        self
    }
}
