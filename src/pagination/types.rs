//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use reqwest::header::HeaderMap;
use std::fmt;

/// 1-based page number of the next request.
///
/// `None` in place of a token means "first page": the page parameter is
/// omitted and the server defaults to page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageToken(u32);

impl PageToken {
    /// Token for an explicit page number
    pub fn new(page: u32) -> Self {
        Self(page)
    }

    /// Page number carried by this token
    pub fn page(self) -> u32 {
        self.0
    }

    /// Token of the page after `previous` (`None` counts as page 1)
    pub fn after(previous: Option<PageToken>) -> Self {
        Self(previous.map_or(1, PageToken::page).saturating_add(1))
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Inspect a response and return the token of the next page, or `None`
    /// when the sequence is complete
    fn next_page_token(
        &self,
        previous: Option<PageToken>,
        headers: &HeaderMap,
        records_count: usize,
    ) -> Option<PageToken>;
}
