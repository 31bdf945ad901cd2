//! Page fetcher
//!
//! Also serves single statuses and profiles, under the same permits and retries.

use super::types::{FetchOutcome, Locator, RetryPolicy};
use crate::config::{Endpoints, ScraperConfig};
use crate::decode::{JsonPageParser, PageParser};
use crate::error::{Error, Result};
use crate::http::{ConcurrencyLimiter, HttpTransport, HttpTransportConfig, Transport};
use crate::query::SearchQuery;
use crate::record::{Account, Tweet};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Fetches and parses single pages.
///
/// Cheap to clone; clones share the transport, parser and permit pool.
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    parser: Arc<dyn PageParser>,
    limiter: ConcurrencyLimiter,
    endpoints: Arc<Endpoints>,
    retry: RetryPolicy,
}

impl PageFetcher {
    /// Create a fetcher with default endpoints, limiter and retry policy
    pub fn new(transport: Arc<dyn Transport>, parser: Arc<dyn PageParser>) -> Self {
        Self {
            transport,
            parser,
            limiter: ConcurrencyLimiter::default(),
            endpoints: Arc::new(Endpoints::default()),
            retry: RetryPolicy::default(),
        }
    }

    /// Build the HTTP transport, JSON parser and limiter described by `config`
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_config(HttpTransportConfig::from(&config.http))?;
        let parser = JsonPageParser::from_config(&config.parser);

        Ok(Self::new(Arc::new(transport), Arc::new(parser))
            .with_endpoints(config.endpoints()?)
            .with_limiter(ConcurrencyLimiter::new(config.max_concurrency))
            .with_retry_policy(RetryPolicy::from_config(&config.http)))
    }

    /// Use a different permit pool
    #[must_use]
    pub fn with_limiter(mut self, limiter: ConcurrencyLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Use different endpoints
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Arc::new(endpoints);
        self
    }

    /// Use a different retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The permit pool
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// The endpoint templates
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Locator for the page after `cursor`
    pub fn locator(&self, query: &SearchQuery, cursor: Option<&str>) -> Locator {
        self.endpoints.locator(query, cursor)
    }

    /// Fetch a page with the configured retry budget
    pub async fn fetch(&self, locator: &Locator) -> Result<FetchOutcome> {
        self.fetch_with_retries(locator, self.retry.max_retries).await
    }

    /// Fetch a page, retrying transient failures up to `retries` times.
    ///
    /// Permanent failures (non-transient transport errors, unreadable pages)
    /// are returned as errors.
    pub async fn fetch_with_retries(
        &self,
        locator: &Locator,
        retries: u32,
    ) -> Result<FetchOutcome> {
        let body = match self.request(&locator.url, retries).await? {
            Reply::Body(body) => body,
            Reply::GaveUp {
                attempts,
                last_error,
            } => {
                return Ok(FetchOutcome::RetriesExhausted {
                    attempts,
                    last_error,
                });
            }
        };

        let mut page = self.parser.parse(&body, locator.kind)?;
        if page.tweets.is_empty() {
            page.cursor = None;
        }
        debug!(
            "Fetched {} records ({} skipped) from {}",
            page.tweets.len(),
            page.skipped,
            locator
        );
        Ok(FetchOutcome::Page(page))
    }

    /// Fetch one tweet by id.
    ///
    /// Shares the permit pool and retry policy with page fetches. Giving up
    /// is an error here, since there is no stream to end quietly.
    pub async fn fetch_status(&self, tweet_id: &str) -> Result<Tweet> {
        let url = self.endpoints.status(tweet_id)?;
        let body = self.request(&url, self.retry.max_retries).await?.into_body()?;
        self.parser.parse_status(&body)
    }

    /// Fetch an account profile by username
    pub async fn fetch_account(&self, username: &str) -> Result<Account> {
        let url = self.endpoints.profile(username)?;
        let body = self.request(&url, self.retry.max_retries).await?.into_body()?;
        self.parser.parse_account(&body)
    }

    /// GET `url`, one permit per attempt, until it succeeds, fails
    /// permanently or the retry budget runs out
    async fn request(&self, url: &Url, retries: u32) -> Result<Reply> {
        let mut remaining = retries;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.attempt(url).await {
                Ok(body) => return Ok(Reply::Body(body)),
                Err(e) if e.is_transient() && remaining > 0 => {
                    remaining -= 1;
                    let delay = self.retry.delay_for(&e, attempt - 1);
                    warn!(
                        "Transient failure on {}, attempt {}/{}, retrying in {:?}: {}",
                        url,
                        attempt,
                        retries + 1,
                        delay,
                        e
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) if e.is_transient() => {
                    warn!("Giving up on {} after {} attempts: {}", url, attempt, e);
                    return Ok(Reply::GaveUp {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One request under one permit
    async fn attempt(&self, url: &Url) -> Result<String> {
        let _permit = self.limiter.acquire().await?;
        self.transport.get(url).await
    }
}

/// What came back from a retried request
enum Reply {
    Body(String),
    GaveUp {
        attempts: u32,
        last_error: String,
    },
}

impl Reply {
    fn into_body(self) -> Result<String> {
        match self {
            Self::Body(body) => Ok(body),
            Self::GaveUp {
                attempts,
                last_error,
            } => Err(Error::RetriesExhausted {
                attempts,
                last_error,
            }),
        }
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("limiter", &self.limiter)
            .field("endpoints", &self.endpoints)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
