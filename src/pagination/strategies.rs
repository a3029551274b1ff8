//! Pagination strategy implementations

use super::params::PAGE_SIZE;
use super::types::{PageToken, Paginator};
use reqwest::header::{HeaderMap, LINK};

/// Page number pagination driven by the `Link` header.
///
/// - An empty page ends the sequence.
/// - With a `Link` header, a `rel="next"` entry advances to the next page
///   and its absence ends the sequence.
/// - Without a `Link` header, a full page advances and a short page ends
///   the sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageNumberPaginator;

impl PageNumberPaginator {
    /// Create a paginator for `per_page` sized pages
    pub fn new() -> Self {
        Self
    }
}

impl Paginator for PageNumberPaginator {
    fn next_page_token(
        &self,
        previous: Option<PageToken>,
        headers: &HeaderMap,
        records_count: usize,
    ) -> Option<PageToken> {
        if records_count == 0 {
            return None;
        }

        let has_next = match headers.get(LINK).and_then(|v| v.to_str().ok()) {
            Some(link) => parse_link_header(link, "next").is_some(),
            None => records_count >= PAGE_SIZE as usize,
        };

        has_next.then(|| PageToken::after(previous))
    }
}

/// Parse a Link header and extract the URL for the given rel
///
/// Format: `<https://host/api/v1/courses?page=2>; rel="next", <...>; rel="last"`
pub fn parse_link_header(header: &str, target_rel: &str) -> Option<String> {
    for part in header.split(',') {
        let part = part.trim();
        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(stripped) = segment.strip_prefix("rel=") {
                rel = Some(stripped.trim_matches('"').trim_matches('\''));
            }
        }

        if let (Some(u), Some(r)) = (url, rel) {
            if r == target_rel {
                return Some(u.to_string());
            }
        }
    }

    None
}
