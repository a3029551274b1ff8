//! Tap configuration
//!
//! The configuration is a flat key-value object. Only `api_key` is
//! required; every filter key is optional and disables its filter when
//! absent. Unknown keys are ignored.

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig, DEFAULT_INITIAL_BACKOFF};
use crate::types::{BackoffType, OptionStringExt};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default Canvas API root
pub const DEFAULT_BASE_URL: &str = "https://canvas.instructure.com/api/v1";

/// Default root account id
pub const DEFAULT_ACCOUNT_ID: u64 = 1;

/// Validated tap configuration
#[derive(Clone, Deserialize)]
pub struct TapConfig {
    /// API token, sent as a bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// API root, including the `/api/v1` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Account whose terms, courses, users and outcomes are read
    #[serde(default = "default_account_id")]
    pub account_id: u64,

    /// Only read courses ending after this date
    #[serde(default)]
    pub course_ends_after: Option<String>,

    /// Only read courses with (or without) enrollments
    #[serde(default)]
    pub with_enrollments: Option<bool>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-request timeout
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,

    /// Retries for transient failures
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// Client-side rate limit
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// How retry delays grow (`constant`, `linear` or `exponential`)
    #[serde(default)]
    pub backoff: Option<BackoffType>,

    /// Delay before the first retry
    #[serde(default)]
    pub initial_backoff_ms: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_account_id() -> u64 {
    DEFAULT_ACCOUNT_ID
}

impl TapConfig {
    /// Build a config from a JSON value and validate it
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::config("config must be a JSON object"));
        }
        let config: TapConfig = serde_json::from_value(value)
            .map_err(|e| Error::config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate inline JSON
    pub fn from_json(json_str: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json_str)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Load a config file. `.yaml`/`.yml` files are read as YAML, anything
    /// else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let value: Value = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?
        };
        Self::from_value(value)
    }

    /// Check required keys and value formats
    pub fn validate(&self) -> Result<()> {
        if self.api_key.clone().none_if_empty().is_none() {
            return Err(Error::missing_field("api_key"));
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;

        if let Some(date) = &self.course_ends_after {
            if !is_date_or_datetime(date) {
                return Err(Error::invalid_value(
                    "course_ends_after",
                    format!("'{date}' is not an ISO 8601 date or datetime"),
                ));
            }
        }

        if self.requests_per_second == Some(0) {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be greater than zero",
            ));
        }

        Ok(())
    }

    /// The API token. Only call on a validated config.
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// Values exposed to path templates as `{{ config.* }}`
    pub fn template_values(&self) -> Value {
        json!({
            "account_id": self.account_id,
            "base_url": self.base_url,
        })
    }

    /// HTTP client settings derived from this config
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .bearer_token(self.api_key());

        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(secs) = self.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(retries) = self.max_retries {
            builder = builder.max_retries(retries);
        }
        if self.backoff.is_some() || self.initial_backoff_ms.is_some() {
            let initial = self
                .initial_backoff_ms
                .map_or(DEFAULT_INITIAL_BACKOFF, Duration::from_millis);
            builder = builder.backoff(self.backoff.unwrap_or_default(), initial);
        }
        if let Some(rps) = self.requests_per_second {
            builder = builder.rate_limit(RateLimiterConfig::new(rps, rps));
        }
        builder.build()
    }
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("course_ends_after", &self.course_ends_after)
            .field("with_enrollments", &self.with_enrollments)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

/// Accepts `2024-06-01`, `2024-06-01T00:00:00Z` and other RFC 3339 forms
fn is_date_or_datetime(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(s).is_ok()
}

/// Configuration specification printed by `tap-canvas spec`
pub fn config_spec() -> Value {
    json!({
        "type": "object",
        "required": ["api_key"],
        "properties": {
            "api_key": {
                "type": "string",
                "secret": true,
                "description": "The token to authenticate against the API service"
            },
            "base_url": {
                "type": "string",
                "default": DEFAULT_BASE_URL,
                "description": "Canvas API root, including /api/v1"
            },
            "account_id": {
                "type": "integer",
                "default": DEFAULT_ACCOUNT_ID,
                "description": "Account to read terms, courses, users and outcomes from"
            },
            "course_ends_after": {
                "type": "string",
                "format": "date",
                "description": "Only sync courses ending after this date"
            },
            "with_enrollments": {
                "type": "boolean",
                "description": "Only sync courses with (true) or without (false) enrollments"
            },
            "user_agent": { "type": "string" },
            "request_timeout_seconds": { "type": "integer" },
            "max_retries": { "type": "integer" },
            "requests_per_second": { "type": "integer" },
            "backoff": {
                "type": "string",
                "enum": ["constant", "linear", "exponential"],
                "default": "exponential"
            },
            "initial_backoff_ms": { "type": "integer" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_minimal_config() {
        let config = TapConfig::from_value(json!({"api_key": "secret"})).unwrap();
        assert_eq!(config.api_key(), "secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.account_id, 1);
        assert!(config.course_ends_after.is_none());
        assert!(config.with_enrollments.is_none());
    }

    #[test]
    fn test_missing_api_key() {
        let err = TapConfig::from_value(json!({"account_id": 3})).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "api_key"));
    }

    #[test]
    fn test_empty_api_key() {
        let err = TapConfig::from_value(json!({"api_key": ""})).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config =
            TapConfig::from_value(json!({"api_key": "k", "start_date": "2024-01-01"})).unwrap();
        assert_eq!(config.api_key(), "k");
    }

    #[test]
    fn test_course_ends_after_validation() {
        assert!(
            TapConfig::from_value(json!({"api_key": "k", "course_ends_after": "2024-06-01"}))
                .is_ok()
        );
        assert!(TapConfig::from_value(
            json!({"api_key": "k", "course_ends_after": "2024-06-01T00:00:00Z"})
        )
        .is_ok());

        let err =
            TapConfig::from_value(json!({"api_key": "k", "course_ends_after": "next week"}))
                .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "course_ends_after"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = TapConfig::from_value(json!({"api_key": "k", "base_url": "not a url"}))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "base_url"));
    }

    #[test]
    fn test_not_an_object() {
        assert!(TapConfig::from_value(json!(["api_key"])).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"api_key": "from-file", "account_id": 7}}"#).unwrap();

        let config = TapConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_key(), "from-file");
        assert_eq!(config.account_id, 7);
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "api_key: from-yaml").unwrap();
        writeln!(file, "with_enrollments: true").unwrap();

        let config = TapConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_key(), "from-yaml");
        assert_eq!(config.with_enrollments, Some(true));
    }

    #[test]
    fn test_missing_file() {
        let err = TapConfig::from_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_http_client_config() {
        let config = TapConfig::from_value(json!({
            "api_key": "k",
            "base_url": "https://school.instructure.com/api/v1",
            "max_retries": 1,
            "request_timeout_seconds": 5
        }))
        .unwrap();

        let http = config.http_client_config();
        assert_eq!(
            http.base_url.as_deref(),
            Some("https://school.instructure.com/api/v1")
        );
        assert_eq!(http.max_retries, 1);
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(http.bearer_token.as_deref(), Some("k"));
    }

    #[test]
    fn test_backoff_settings() {
        let default = TapConfig::from_value(json!({"api_key": "k"}))
            .unwrap()
            .http_client_config();
        assert_eq!(default.backoff_type, BackoffType::Exponential);
        assert_eq!(default.initial_backoff, DEFAULT_INITIAL_BACKOFF);

        let http = TapConfig::from_value(json!({
            "api_key": "k",
            "backoff": "linear",
            "initial_backoff_ms": 250
        }))
        .unwrap()
        .http_client_config();
        assert_eq!(http.backoff_type, BackoffType::Linear);
        assert_eq!(http.initial_backoff, Duration::from_millis(250));

        let only_delay = TapConfig::from_value(json!({"api_key": "k", "initial_backoff_ms": 5}))
            .unwrap()
            .http_client_config();
        assert_eq!(only_delay.backoff_type, BackoffType::Exponential);
        assert_eq!(only_delay.initial_backoff, Duration::from_millis(5));
    }

    #[test]
    fn test_unknown_backoff_rejected() {
        let err = TapConfig::from_value(json!({"api_key": "k", "backoff": "random"})).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_config_spec_requires_api_key() {
        let spec = config_spec();
        assert_eq!(spec["required"], json!(["api_key"]));
        assert!(spec["properties"]["course_ends_after"].is_object());
    }
}
