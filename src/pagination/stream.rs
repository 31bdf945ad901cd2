//! Single-query paginator

use super::types::{PaginationState, StreamPhase, StreamStats, Termination};
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::fetch::{FetchOutcome, PageFetcher};
use crate::query::SearchQuery;
use crate::record::Tweet;
use futures::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use tracing::{debug, info};

/// Boxed stream of tweets
pub type TweetResultStream = Pin<Box<dyn Stream<Item = Result<Tweet>> + Send>>;

/// A validated search query with an emission limit.
///
/// Each call to [`Query::tweets`] starts a fresh stream from the first page.
#[derive(Debug, Clone)]
pub struct Query {
    query: SearchQuery,
    limit: usize,
    fetcher: PageFetcher,
}

impl Query {
    /// Validate `query` and bind it to a fetcher. A `limit` of 0 is unbounded.
    pub fn new(query: &str, limit: usize, fetcher: PageFetcher) -> Result<Self> {
        Ok(Self::from_search(SearchQuery::parse(query)?, limit, fetcher))
    }

    /// Bind an already validated query
    pub fn from_search(query: SearchQuery, limit: usize, fetcher: PageFetcher) -> Self {
        Self {
            query,
            limit,
            fetcher,
        }
    }

    /// Build a query with its own fetcher and the configured default limit
    pub fn from_config(query: &str, config: &ScraperConfig) -> Result<Self> {
        let fetcher = PageFetcher::from_config(config)?;
        Self::new(query, config.default_limit, fetcher)
    }

    /// Set the emission limit
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The validated query
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// The emission limit, 0 for unbounded
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The fetcher used for every page
    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Start a new stream over this query
    pub fn tweets(&self) -> TweetStream {
        TweetStream::new(self.query.clone(), self.limit, self.fetcher.clone())
    }
}

/// Lazy, pull-based sequence of tweets for one query.
///
/// Pages are fetched only when the buffer is empty. Records are yielded in
/// page order. After the stream ends, [`TweetStream::termination`] says why.
#[derive(Debug)]
pub struct TweetStream {
    query: SearchQuery,
    fetcher: PageFetcher,
    state: PaginationState,
    buffer: VecDeque<Tweet>,
    pending_end: Option<Termination>,
    termination: Option<Termination>,
    stats: StreamStats,
}

impl TweetStream {
    fn new(query: SearchQuery, limit: usize, fetcher: PageFetcher) -> Self {
        Self {
            query,
            fetcher,
            state: PaginationState::new(limit),
            buffer: VecDeque::new(),
            pending_end: None,
            termination: None,
            stats: StreamStats::default(),
        }
    }

    /// Pull the next tweet.
    ///
    /// Returns `Ok(None)` once the stream has ended, on every later call too.
    /// A permanent failure is returned once as `Err` and ends the stream.
    pub async fn next(&mut self) -> Result<Option<Tweet>> {
        loop {
            if self.termination.is_some() {
                return Ok(None);
            }
            if self.state.limit_reached() {
                self.finish(Termination::LimitReached);
                continue;
            }
            if let Some(tweet) = self.buffer.pop_front() {
                self.state.record_emitted();
                self.stats.records_emitted += 1;
                if self.state.limit_reached() {
                    self.finish(Termination::LimitReached);
                }
                return Ok(Some(tweet));
            }
            if let Some(end) = self.pending_end.take() {
                self.finish(end);
                continue;
            }
            self.fetch_next_page().await?;
        }
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let locator = self
            .fetcher
            .locator(&self.query, self.state.cursor.as_deref());
        let outcome = self.fetcher.fetch(&locator).await;
        self.state.started = true;

        match outcome {
            Ok(FetchOutcome::Page(page)) => {
                self.stats.pages_fetched += 1;
                self.stats.records_skipped += page.skipped;
                let empty = page.tweets.is_empty();
                self.buffer.extend(page.tweets);

                if empty {
                    self.pending_end = Some(Termination::Exhausted);
                } else if !self.state.advance(page.cursor) {
                    debug!("No new cursor for '{}', draining last page", self.query);
                    self.pending_end = Some(Termination::Exhausted);
                }
                Ok(())
            }
            Ok(FetchOutcome::RetriesExhausted {
                attempts,
                last_error,
            }) => {
                self.pending_end = Some(Termination::GaveUp {
                    attempts,
                    last_error,
                });
                Ok(())
            }
            Err(e) => {
                self.finish(Termination::Aborted {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn finish(&mut self, termination: Termination) {
        info!(
            "Stream for '{}' finished ({}): {} records from {} pages",
            self.query, termination, self.stats.records_emitted, self.stats.pages_fetched
        );
        self.buffer.clear();
        self.pending_end = None;
        self.termination = Some(termination);
    }

    /// Why the stream ended, once it has
    pub fn termination(&self) -> Option<&Termination> {
        self.termination.as_ref()
    }

    /// Where the stream is in its fetch loop
    pub fn phase(&self) -> StreamPhase {
        if self.termination.is_some() {
            StreamPhase::Finished
        } else if self.pending_end.is_some() {
            StreamPhase::Draining
        } else if self.state.started {
            StreamPhase::HasMore
        } else {
            StreamPhase::FirstPage
        }
    }

    /// Fetch and emission counters
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Cursor and emission state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// The query this stream pages through
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Check if nothing more will be yielded
    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    /// Drain the stream into a vector, stopping at the first error
    pub async fn collect_all(mut self) -> Result<Vec<Tweet>> {
        let mut tweets = Vec::new();
        while let Some(tweet) = self.next().await? {
            tweets.push(tweet);
        }
        Ok(tweets)
    }

    /// Convert into a `futures::Stream`.
    ///
    /// The boxed stream ends after yielding an error.
    pub fn into_stream(self) -> TweetResultStream {
        Box::pin(futures::stream::unfold(Some(self), |state| async move {
            let mut stream = state?;
            match stream.next().await {
                Ok(Some(tweet)) => Some((Ok(tweet), Some(stream))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        }))
    }
}
