//! Pagination module
//!
//! Canvas paginates list endpoints with a 1-based `page` parameter and a
//! `Link` response header.
//!
//! # Overview
//!
//! - [`build_params`] computes the query parameters of the next request
//!   from the previous page token, the stream definition and the config.
//! - [`Paginator`] decides, from a response, whether another page exists
//!   and which token it has.

mod params;
mod strategies;
mod types;

pub use params::{build_params, QueryParams, PAGE_SIZE};
pub use strategies::{parse_link_header, PageNumberPaginator};
pub use types::{PageToken, Paginator};
