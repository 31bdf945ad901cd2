//! Configuration types
//!
//! `ScraperConfig` is loaded from YAML (every field has a default) and
//! drives construction of the transport, parser, limiter and fetcher.
//! `Endpoints` turns a query and an optional cursor into a request URL.
//!
//! ```yaml
//! base_url: https://twitter.com
//! language: en
//! max_concurrency: 10
//! default_limit: 20
//! http:
//!   timeout_seconds: 30
//!   max_retries: 3
//!   retry_backoff:
//!     type: exponential
//!     initial_ms: 0
//!   rate_limit:
//!     requests_per_second: 5
//!     burst_size: 5
//! parser:
//!   record_path: items
//!   cursor_path: min_position
//!   status_path: $
//!   account_path: $
//! ```

use crate::decode::PageKind;
use crate::error::{Error, Result};
use crate::fetch::Locator;
use crate::query::SearchQuery;
use crate::types::{BackoffType, OptionStringExt, StringMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Scheme and host of the remote search
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Language filter appended to every request
    #[serde(default = "default_language")]
    pub language: Option<String>,

    /// Per-query emission limit (0 = unbounded)
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Maximum simultaneous in-flight requests across all queries
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Page parser configuration
    #[serde(default)]
    pub parser: ParserConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: default_language(),
            default_limit: default_limit(),
            max_concurrency: default_max_concurrency(),
            http: HttpConfig::default(),
            parser: ParserConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://twitter.com".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_language() -> Option<String> {
    Some("en".to_string())
}

fn default_limit() -> usize {
    20
}

fn default_max_concurrency() -> usize {
    10
}

impl ScraperConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set or clear the language filter
    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.none_if_empty();
        self
    }

    /// Set the per-query limit
    #[must_use]
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the concurrency limit
    #[must_use]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Set the retry budget
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.http.max_retries = retries;
        self
    }

    /// Set the retry backoff
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.http.retry_backoff = backoff;
        self
    }

    /// Check values that would otherwise fail later
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::config("max_concurrency must be greater than 0"));
        }
        let url = Url::parse(&self.base_url)?;
        if url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base_url '{}' cannot be used as a base",
                self.base_url
            )));
        }
        if self.parser.record_path.trim().is_empty() {
            return Err(Error::config("parser.record_path cannot be empty"));
        }
        Ok(())
    }

    /// Build the endpoint templates
    pub fn endpoints(&self) -> Result<Endpoints> {
        Endpoints::new(&self.base_url, self.language.clone())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retry budget for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Optional request rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
            headers: StringMap::new(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: None,
        }
    }
}

impl HttpConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    format!("tweet-stream/{}", env!("CARGO_PKG_VERSION"))
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default)]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: 0,
            max_ms: default_max_ms(),
        }
    }
}

impl BackoffConfig {
    /// Create a backoff config
    pub fn new(backoff_type: BackoffType, initial_ms: u64, max_ms: u64) -> Self {
        Self {
            backoff_type,
            initial_ms,
            max_ms,
        }
    }
}

fn default_max_ms() -> u64 {
    60000
}

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second limit
    pub requests_per_second: u32,

    /// Burst size (max tokens in bucket)
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_burst() -> u32 {
    1
}

// ============================================================================
// Parser Config
// ============================================================================

/// Page parser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Dot path to the records array
    #[serde(default = "default_record_path")]
    pub record_path: String,

    /// Dot path to the continuation cursor
    #[serde(default = "default_cursor_path")]
    pub cursor_path: Option<String>,

    /// Dot path to the record in a single-status response
    #[serde(default = "default_root_path")]
    pub status_path: String,

    /// Dot path to the record in a profile response
    #[serde(default = "default_root_path")]
    pub account_path: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            record_path: default_record_path(),
            cursor_path: default_cursor_path(),
            status_path: default_root_path(),
            account_path: default_root_path(),
        }
    }
}

fn default_record_path() -> String {
    "items".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_cursor_path() -> Option<String> {
    Some("min_position".to_string())
}

fn default_root_path() -> String {
    "$".to_string()
}

// ============================================================================
// Endpoints
// ============================================================================

/// Request URLs: search pages, single statuses and profiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
    search: Url,
    timeline: Url,
    language: Option<String>,
}

impl Endpoints {
    /// First-page path, relative to the base URL
    pub const SEARCH_PATH: &'static str = "search";
    /// Continuation path, relative to the base URL
    pub const TIMELINE_PATH: &'static str = "i/search/timeline";

    /// Create endpoints under a base URL
    pub fn new(base_url: &str, language: Option<String>) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        if base.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base_url '{base_url}' cannot be used as a base"
            )));
        }
        Ok(Self {
            search: base.join(Self::SEARCH_PATH)?,
            timeline: base.join(Self::TIMELINE_PATH)?,
            base,
            language: language.none_if_empty(),
        })
    }

    /// URL of a single status page
    pub fn status(&self, tweet_id: &str) -> Result<Url> {
        let id = tweet_id.trim();
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_query(tweet_id, "tweet id must be numeric"));
        }
        self.under_base(&["anyuser", "status", id])
    }

    /// URL of an account's profile page; a leading `@` is ignored
    pub fn profile(&self, username: &str) -> Result<Url> {
        let user = username.trim().trim_start_matches('@');
        if user.is_empty() || !user.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_query(username, "not a valid username"));
        }
        self.under_base(&[user])
    }

    fn under_base(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("'{}' cannot be used as a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Locator for the page after `cursor`, or the first page when there is none
    pub fn locator(&self, query: &SearchQuery, cursor: Option<&str>) -> Locator {
        match cursor {
            None => {
                let mut url = self.search.clone();
                url.query_pairs_mut()
                    .append_pair("f", "tweets")
                    .append_pair("vertical", "default")
                    .append_pair("q", query.as_str());
                self.append_language(&mut url);
                Locator::new(url, PageKind::Initial)
            }
            Some(position) => {
                let mut url = self.timeline.clone();
                url.query_pairs_mut()
                    .append_pair("f", "tweets")
                    .append_pair("vertical", "default")
                    .append_pair("include_available_features", "1")
                    .append_pair("include_entities", "1")
                    .append_pair("reset_error_state", "false")
                    .append_pair("src", "typd")
                    .append_pair("max_position", position)
                    .append_pair("q", query.as_str());
                self.append_language(&mut url);
                Locator::new(url, PageKind::Continuation)
            }
        }
    }

    fn append_language(&self, url: &mut Url) {
        if let Some(language) = &self.language {
            url.query_pairs_mut().append_pair("l", language);
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base: Url::parse("https://twitter.com/").expect("valid default URL"),
            search: Url::parse("https://twitter.com/search").expect("valid default URL"),
            timeline: Url::parse("https://twitter.com/i/search/timeline")
                .expect("valid default URL"),
            language: default_language(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a config from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<ScraperConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    load_config_from_str(&content)
}

/// Load a config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<ScraperConfig> {
    let config: ScraperConfig = if yaml.trim().is_empty() {
        ScraperConfig::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = ScraperConfig::default();
        assert_eq!(config.base_url, "https://twitter.com");
        assert_eq!(config.language, Some("en".to_string()));
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
        assert_eq!(config.http.retry_backoff.initial_ms, 0);
        assert!(config.http.rate_limit.is_none());
        assert_eq!(config.parser.record_path, "items");
        assert_eq!(config.parser.cursor_path, Some("min_position".to_string()));
        assert_eq!(config.parser.status_path, "$");
        assert_eq!(config.parser.account_path, "$");
    }

    #[test]
    fn test_load_config_from_str() {
        let yaml = r"
base_url: http://localhost:8080
language: fr
max_concurrency: 4
default_limit: 0
http:
  max_retries: 5
  retry_backoff:
    type: linear
    initial_ms: 50
  rate_limit:
    requests_per_second: 2
parser:
  record_path: data.tweets
  cursor_path: ~
  account_path: profile
";
        let config = load_config_from_str(yaml).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.language, Some("fr".to_string()));
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.default_limit, 0);
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(
            config.http.retry_backoff,
            BackoffConfig::new(BackoffType::Linear, 50, 60000)
        );
        assert_eq!(
            config.http.rate_limit,
            Some(RateLimitConfig {
                requests_per_second: 2,
                burst_size: 1
            })
        );
        assert_eq!(config.parser.record_path, "data.tweets");
        assert_eq!(config.parser.cursor_path, None);
        assert_eq!(config.parser.status_path, "$");
        assert_eq!(config.parser.account_path, "profile");
    }

    #[test]
    fn test_load_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.max_concurrency, 10);
    }

    #[test]
    fn test_load_config_rejects_zero_concurrency() {
        let err = load_config_from_str("max_concurrency: 0").unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }

    #[test]
    fn test_load_config_rejects_bad_url() {
        assert!(load_config_from_str("base_url: not a url").is_err());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_limit: 7").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.default_limit, 7);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/tweet-stream.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_config_builder() {
        let config = ScraperConfig::new()
            .with_base_url("http://127.0.0.1:9000")
            .with_language(Some(String::new()))
            .with_default_limit(3)
            .with_max_concurrency(2)
            .with_max_retries(1);

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.language, None);
        assert_eq!(config.default_limit, 3);
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.http.max_retries, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_first_page_locator() {
        let endpoints = Endpoints::new("https://twitter.com", Some("en".into())).unwrap();
        let query = SearchQuery::parse("#rust from:alice").unwrap();
        let locator = endpoints.locator(&query, None);

        assert_eq!(locator.kind, PageKind::Initial);
        assert_eq!(locator.url.path(), "/search");
        let pairs: Vec<(String, String)> = locator.url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("f".to_string(), "tweets".to_string()),
                ("vertical".to_string(), "default".to_string()),
                ("q".to_string(), "#rust from:alice".to_string()),
                ("l".to_string(), "en".to_string()),
            ]
        );
        assert!(locator.url.as_str().contains("q=%23rust+from%3Aalice"));
    }

    #[test]
    fn test_continuation_locator() {
        let endpoints = Endpoints::new("http://localhost:1234/proxy", None).unwrap();
        let query = SearchQuery::parse("rust").unwrap();
        let locator = endpoints.locator(&query, Some("TWEET-1-9"));

        assert_eq!(locator.kind, PageKind::Continuation);
        assert_eq!(locator.url.path(), "/proxy/i/search/timeline");
        let max_position = locator
            .url
            .query_pairs()
            .find(|(k, _)| k == "max_position")
            .map(|(_, v)| v.into_owned());
        assert_eq!(max_position, Some("TWEET-1-9".to_string()));
        assert!(!locator.url.query_pairs().any(|(k, _)| k == "l"));
    }

    #[test]
    fn test_status_and_profile_urls() {
        let endpoints = Endpoints::new("http://localhost:1234/proxy", Some("en".into())).unwrap();

        let status = endpoints.status(" 1234567890 ").unwrap();
        assert_eq!(
            status.as_str(),
            "http://localhost:1234/proxy/anyuser/status/1234567890"
        );

        let profile = endpoints.profile("@rust_lang").unwrap();
        assert_eq!(profile.as_str(), "http://localhost:1234/proxy/rust_lang");

        let root = Endpoints::default();
        assert_eq!(
            root.status("42").unwrap().as_str(),
            "https://twitter.com/anyuser/status/42"
        );
        assert_eq!(root.profile("jack").unwrap().as_str(), "https://twitter.com/jack");
    }

    #[test]
    fn test_status_and_profile_reject_bad_input() {
        let endpoints = Endpoints::default();
        assert!(endpoints.status("").unwrap_err().is_validation());
        assert!(endpoints.status("12ab").unwrap_err().is_validation());
        assert!(endpoints.status("1/2").unwrap_err().is_validation());
        assert!(endpoints.profile("@").unwrap_err().is_validation());
        assert!(endpoints.profile("a/b").unwrap_err().is_validation());
        assert!(endpoints.profile("two words").unwrap_err().is_validation());
    }

    #[test]
    fn test_default_endpoints_match_default_config() {
        let from_config = ScraperConfig::default().endpoints().unwrap();
        assert_eq!(from_config, Endpoints::default());
    }
}
