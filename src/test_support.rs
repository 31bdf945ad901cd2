//! In-process transport for unit tests
//!
//! Serves canned pages per query. Page `n` links to `page-{n+1}`; requests
//! past the last page get an empty page. Fixed bodies can be served by URL
//! path for status and profile lookups; faults for those are keyed by path.

use crate::decode::JsonPageParser;
use crate::error::{Error, Result};
use crate::fetch::{PageFetcher, RetryPolicy};
use crate::http::{ConcurrencyLimiter, Transport};
use crate::record::Tweet;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Tweet with a numeric id and a unix timestamp
pub(crate) fn tweet(id: u64, ts: i64) -> Tweet {
    Tweet::new(id.to_string(), format!("user{id}"), Utc.timestamp_opt(ts, 0).unwrap())
}

/// Pages of tweets from `(id, timestamp)` pairs
pub(crate) fn pages(layout: &[&[(u64, i64)]]) -> Vec<Vec<Tweet>> {
    layout
        .iter()
        .map(|page| page.iter().map(|&(id, ts)| tweet(id, ts)).collect())
        .collect()
}

/// What to do when a query is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    /// Fail transiently this many times, then behave
    Transient(u32),
    /// Fail transiently forever
    AlwaysTransient,
    /// Fail permanently on every request
    Permanent,
    /// Fail permanently on requests for this page index
    PermanentOnPage(usize),
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    pages: HashMap<String, Vec<Vec<Tweet>>>,
    bodies: HashMap<String, String>,
    faults: Mutex<HashMap<String, Fault>>,
    delay: Duration,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    log: Mutex<Vec<(String, Option<usize>)>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_query(mut self, query: &str, pages: Vec<Vec<Tweet>>) -> Self {
        self.pages.insert(query.to_string(), pages);
        self
    }

    pub(crate) fn with_body(mut self, path: &str, body: serde_json::Value) -> Self {
        self.bodies.insert(path.to_string(), body.to_string());
        self
    }

    pub(crate) fn with_fault(self, query: &str, fault: Fault) -> Self {
        self.faults
            .lock()
            .unwrap()
            .insert(query.to_string(), fault);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Total requests received
    pub(crate) fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Highest number of requests seen in flight at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Page indexes requested for a query, in order
    pub(crate) fn pages_requested(&self, query: &str) -> Vec<usize> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(q, _)| q == query)
            .filter_map(|(_, page)| *page)
            .collect()
    }

    fn fault_for(&self, query: &str, page: Option<usize>) -> Option<Error> {
        let mut faults = self.faults.lock().unwrap();
        match faults.get_mut(query) {
            Some(Fault::Transient(0)) | None => None,
            Some(Fault::Transient(n)) => {
                *n -= 1;
                Some(Error::transport("connection reset by peer"))
            }
            Some(Fault::AlwaysTransient) => Some(Error::transport("connection refused")),
            Some(Fault::Permanent) => Some(Error::http_status(403, "forbidden")),
            Some(Fault::PermanentOnPage(bad)) if page == Some(*bad) => {
                Some(Error::http_status(403, "forbidden"))
            }
            Some(Fault::PermanentOnPage(_)) => None,
        }
    }

    fn body(&self, query: &str, page: Option<usize>) -> String {
        let tweets = page
            .and_then(|index| self.pages.get(query)?.get(index).cloned())
            .unwrap_or_default();
        let next = page.map_or_else(String::new, |index| format!("page-{}", index + 1));
        json!({
            "min_position": next,
            "items": tweets,
        })
        .to_string()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &Url) -> Result<String> {
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let fixed = self.bodies.get(url.path());
        let query = match fixed {
            Some(_) => url.path().to_string(),
            None => params.get("q").cloned().unwrap_or_default(),
        };
        let page = match (fixed, params.get("max_position")) {
            (Some(_), _) => None,
            (None, None) => Some(0),
            (None, Some(position)) => position
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok()),
        };

        self.requests.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push((query.clone(), page));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(err) = self.fault_for(&query, page) {
            return Err(err);
        }
        Ok(fixed.cloned().unwrap_or_else(|| self.body(&query, page)))
    }
}

/// Fetcher over a fake transport with immediate retries
pub(crate) fn fetcher(transport: &Arc<FakeTransport>, capacity: usize) -> PageFetcher {
    let transport: Arc<dyn Transport> = transport.clone();
    PageFetcher::new(transport, Arc::new(JsonPageParser::new()))
        .with_limiter(ConcurrencyLimiter::new(capacity))
        .with_retry_policy(RetryPolicy::new(3))
}
