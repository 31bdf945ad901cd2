//! Fetch types

use crate::config::HttpConfig;
use crate::decode::{PageKind, ParsedPage};
use crate::error::Error;
use crate::types::BackoffType;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Where to request a page from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    /// Full request URL
    pub url: Url,
    /// Endpoint kind, passed on to the parser
    pub kind: PageKind,
}

impl Locator {
    /// Create a locator
    pub fn new(url: Url, kind: PageKind) -> Self {
        Self { url, kind }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Retry budget and backoff for transient failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_type: BackoffType::Exponential,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Retry immediately, up to `max_retries` times
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Never retry
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Build from HTTP config
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_type: config.retry_backoff.backoff_type,
            initial_backoff: Duration::from_millis(config.retry_backoff.initial_ms),
            max_backoff: Duration::from_millis(config.retry_backoff.max_ms),
        }
    }

    /// Set backoff configuration
    #[must_use]
    pub fn with_backoff(
        mut self,
        backoff_type: BackoffType,
        initial: Duration,
        max: Duration,
    ) -> Self {
        self.backoff_type = backoff_type;
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Delay before retry number `attempt` (zero-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }

    /// Delay before retrying after `error`.
    ///
    /// A server-provided retry-after wins over the computed backoff, capped
    /// at `max_backoff`.
    pub fn delay_for(&self, error: &Error, attempt: u32) -> Duration {
        let backoff = self.backoff(attempt);
        match error {
            Error::RateLimited {
                retry_after_seconds,
            } => Duration::from_secs(*retry_after_seconds)
                .max(backoff)
                .min(self.max_backoff),
            _ => backoff,
        }
    }
}

/// Result of fetching one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The request succeeded and the body was parsed
    Page(ParsedPage),
    /// Every attempt failed transiently
    RetriesExhausted {
        /// Attempts made, including the first
        attempts: u32,
        /// Description of the last failure
        last_error: String,
    },
}

impl FetchOutcome {
    /// The page, or an empty page without a cursor after giving up
    pub fn into_page(self) -> ParsedPage {
        match self {
            Self::Page(page) => page,
            Self::RetriesExhausted { .. } => ParsedPage::empty(),
        }
    }

    /// Borrow the page if the fetch succeeded
    pub fn page(&self) -> Option<&ParsedPage> {
        match self {
            Self::Page(page) => Some(page),
            Self::RetriesExhausted { .. } => None,
        }
    }

    /// Check if the fetcher gave up
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}
