//! HTTP client module
//!
//! Provides the HTTP client used by every stream.
//!
//! # Features
//!
//! - **Bearer Auth**: The configured API key is sent on every request
//! - **Automatic Retries**: Transient failures are retried with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff

mod client;
mod rate_limit;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, JsonResponse, RequestConfig,
    DEFAULT_INITIAL_BACKOFF, MAX_BACKOFF,
};
pub use rate_limit::RateLimiterConfig;
