//! Request query parameters

use super::types::PageToken;
use crate::config::TapConfig;
use crate::streams::StreamDefinition;

/// Records requested per page
pub const PAGE_SIZE: u32 = 100;

/// Ordered query parameters. Keys may repeat (`include[]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create an empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// First value of a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a key, in insertion order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate parameters in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Owned key/value pairs, in order
    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

/// Query parameters for the next request of a stream.
///
/// - `per_page` is always sent.
/// - `page` is sent only for pages after the first.
/// - `sort=asc&order_by=<field>` only when the stream has an ordering field.
/// - Config filters only when their config key is present.
/// - Fixed stream parameters last.
///
/// Parent context never lands in the query; it is rendered into the path.
pub fn build_params(
    next_page_token: Option<PageToken>,
    stream: &StreamDefinition,
    config: &TapConfig,
) -> QueryParams {
    let mut params = QueryParams::new();
    params.push("per_page", PAGE_SIZE.to_string());

    if let Some(token) = next_page_token {
        params.push("page", token.to_string());
    }

    if let Some(field) = stream.order_by {
        params.push("sort", "asc");
        params.push("order_by", field);
    }

    for filter in stream.filters {
        if let Some(value) = filter.value(config) {
            params.push(filter.param(), value);
        }
    }

    for (key, value) in stream.extra_params {
        params.push(*key, *value);
    }

    params
}
