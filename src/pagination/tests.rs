//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::test_support::{fetcher, pages, tweet, FakeTransport, Fault};
use async_trait::async_trait;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

fn three_pages() -> Vec<Vec<crate::record::Tweet>> {
    pages(&[
        &[(6, 600), (5, 500)],
        &[(4, 400), (3, 300)],
        &[(2, 200), (1, 100)],
    ])
}

fn ids(tweets: &[crate::record::Tweet]) -> Vec<String> {
    tweets.iter().map(|t| t.tweet_id().to_string()).collect()
}

async fn drain(stream: &mut TweetStream) -> Vec<crate::record::Tweet> {
    let mut out = Vec::new();
    while let Some(tweet) = stream.next().await.unwrap() {
        out.push(tweet);
    }
    out
}

/// Always answers with the same two records and the same cursor
struct StuckTransport {
    requests: AtomicUsize,
}

#[async_trait]
impl Transport for StuckTransport {
    async fn get(&self, _url: &Url) -> Result<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(json!({
            "min_position": "same",
            "items": [tweet(2, 200), tweet(1, 100), { "text": "no id" }],
        })
        .to_string())
    }
}

/// Cursors go a -> b -> a -> b ... and every page has a fresh record
struct CyclingTransport {
    requests: AtomicUsize,
}

#[async_trait]
impl Transport for CyclingTransport {
    async fn get(&self, _url: &Url) -> Result<String> {
        let n = self.requests.fetch_add(1, Ordering::SeqCst) as u64;
        let cursor = if n % 2 == 0 { "a" } else { "b" };
        Ok(json!({
            "min_position": cursor,
            "items": [tweet(100 - n, 1000 - n as i64)],
        })
        .to_string())
    }
}

fn stuck_query() -> (Arc<StuckTransport>, Query) {
    let transport = Arc::new(StuckTransport {
        requests: AtomicUsize::new(0),
    });
    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let fetcher = crate::fetch::PageFetcher::new(
        dyn_transport,
        Arc::new(crate::decode::JsonPageParser::new()),
    );
    (transport, Query::new("stuck", 0, fetcher).unwrap())
}

// ============================================================================
// PaginationState Tests
// ============================================================================

#[test]
fn test_pagination_state_limit() {
    let mut state = PaginationState::new(2);
    assert!(!state.limit_reached());
    state.record_emitted();
    state.record_emitted();
    assert!(state.limit_reached());

    let mut unbounded = PaginationState::new(0);
    for _ in 0..1000 {
        unbounded.record_emitted();
    }
    assert!(!unbounded.limit_reached());
}

#[test]
fn test_pagination_state_advance() {
    let mut state = PaginationState::new(0);
    assert!(state.advance(Some("a".to_string())));
    assert_eq!(state.cursor.as_deref(), Some("a"));
    assert!(state.advance(Some("b".to_string())));
    assert!(!state.advance(Some("b".to_string())));
    assert!(!state.advance(None));
    assert_eq!(state.cursor.as_deref(), Some("b"));
}

#[test]
fn test_pagination_state_rejects_cursor_cycle() {
    let mut state = PaginationState::new(0);
    assert!(state.advance(Some("a".to_string())));
    assert!(state.advance(Some("b".to_string())));
    assert!(!state.advance(Some("a".to_string())));
    assert_eq!(state.cursor.as_deref(), Some("b"));
}

#[test]
fn test_termination_classification() {
    let gave_up = Termination::GaveUp {
        attempts: 4,
        last_error: "timeout".to_string(),
    };
    assert!(gave_up.is_failure());
    assert!(gave_up.is_retryable());
    assert_eq!(gave_up.to_string(), "gave up after 4 attempts: timeout");

    let aborted = Termination::Aborted {
        error: "HTTP 403".to_string(),
    };
    assert!(aborted.is_failure());
    assert!(!aborted.is_retryable());

    assert!(!Termination::Exhausted.is_failure());
    assert!(!Termination::LimitReached.is_failure());
}

// ============================================================================
// Query Tests
// ============================================================================

#[test]
fn test_query_rejects_duplicate_since() {
    let transport = Arc::new(FakeTransport::new());
    let err = Query::new(
        "since:2020-01-01 since:2020-02-01",
        0,
        fetcher(&transport, 10),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidQuery { .. }));
    assert!(err.is_validation());
    assert_eq!(transport.requests(), 0);
}

#[test]
fn test_query_accessors() {
    let transport = Arc::new(FakeTransport::new());
    let query = Query::new("rust since:2020-01-01", 5, fetcher(&transport, 10))
        .unwrap()
        .with_limit(7);
    assert_eq!(query.limit(), 7);
    assert_eq!(query.query().filter("since:"), Some("2020-01-01".to_string()));
    assert_eq!(query.fetcher().limiter().capacity(), 10);
}

// ============================================================================
// TweetStream Tests
// ============================================================================

#[tokio::test]
async fn test_stream_preserves_page_order() {
    let transport = Arc::new(FakeTransport::new().with_query("rust", three_pages()));
    let query = Query::new("rust", 0, fetcher(&transport, 10)).unwrap();

    let mut stream = query.tweets();
    let tweets = drain(&mut stream).await;

    assert_eq!(ids(&tweets), vec!["6", "5", "4", "3", "2", "1"]);
    assert_eq!(stream.termination(), Some(&Termination::Exhausted));
    // The page after the last one comes back empty
    assert_eq!(transport.pages_requested("rust"), vec![0, 1, 2, 3]);
    assert_eq!(
        stream.stats(),
        StreamStats {
            pages_fetched: 4,
            records_emitted: 6,
            records_skipped: 0,
        }
    );
}

#[tokio::test]
async fn test_stream_limit_mid_page() {
    let transport = Arc::new(FakeTransport::new().with_query("rust", three_pages()));
    let query = Query::new("rust", 5, fetcher(&transport, 10)).unwrap();

    let mut stream = query.tweets();
    let tweets = drain(&mut stream).await;

    assert_eq!(tweets.len(), 5);
    assert_eq!(stream.termination(), Some(&Termination::LimitReached));
    assert_eq!(transport.pages_requested("rust"), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_stream_limit_on_page_boundary_skips_next_page() {
    let transport = Arc::new(FakeTransport::new().with_query("rust", three_pages()));
    let query = Query::new("rust", 4, fetcher(&transport, 10)).unwrap();

    let mut stream = query.tweets();
    let tweets = drain(&mut stream).await;

    assert_eq!(ids(&tweets), vec!["6", "5", "4", "3"]);
    assert_eq!(transport.pages_requested("rust"), vec![0, 1]);
    assert_eq!(stream.phase(), StreamPhase::Finished);
}

#[tokio::test]
async fn test_stream_termination_is_idempotent() {
    let transport = Arc::new(FakeTransport::new().with_query("rust", three_pages()));
    let query = Query::new("rust", 0, fetcher(&transport, 10)).unwrap();

    let mut stream = query.tweets();
    drain(&mut stream).await;
    let requests = transport.requests();

    for _ in 0..3 {
        assert!(stream.next().await.unwrap().is_none());
    }
    assert_eq!(transport.requests(), requests);
    assert!(stream.is_finished());
}

#[tokio::test]
async fn test_query_restarts_per_stream() {
    let transport = Arc::new(FakeTransport::new().with_query("rust", three_pages()));
    let query = Query::new("rust", 3, fetcher(&transport, 10)).unwrap();

    let first = query.tweets().collect_all().await.unwrap();
    let second = query.tweets().collect_all().await.unwrap();
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn test_stream_empty_first_page() {
    let transport = Arc::new(FakeTransport::new());
    let query = Query::new("nothing", 0, fetcher(&transport, 10)).unwrap();

    let mut stream = query.tweets();
    assert_eq!(stream.phase(), StreamPhase::FirstPage);
    assert!(stream.next().await.unwrap().is_none());
    assert_eq!(stream.termination(), Some(&Termination::Exhausted));
    assert_eq!(transport.requests(), 1);
}

#[tokio::test]
async fn test_stream_phases() {
    let transport = Arc::new(FakeTransport::new().with_query("rust", three_pages()));
    let query = Query::new("rust", 0, fetcher(&transport, 10)).unwrap();

    let mut stream = query.tweets();
    assert_eq!(stream.phase(), StreamPhase::FirstPage);
    stream.next().await.unwrap();
    assert_eq!(stream.phase(), StreamPhase::HasMore);
    assert_eq!(stream.state().cursor.as_deref(), Some("page-1"));
    drain(&mut stream).await;
    assert_eq!(stream.phase(), StreamPhase::Finished);
}

#[tokio::test]
async fn test_stream_recovers_from_transient_failures() {
    let transport = Arc::new(
        FakeTransport::new()
            .with_query("rust", three_pages())
            .with_fault("rust", Fault::Transient(2)),
    );
    let query = Query::new("rust", 0, fetcher(&transport, 10)).unwrap();

    let mut stream = query.tweets();
    let tweets = drain(&mut stream).await;

    assert_eq!(tweets.len(), 6);
    assert_eq!(stream.termination(), Some(&Termination::Exhausted));
}

#[tokio::test]
async fn test_stream_gives_up_quietly() {
    let transport = Arc::new(
        FakeTransport::new()
            .with_query("rust", three_pages())
            .with_fault("rust", Fault::AlwaysTransient),
    );
    let query = Query::new("rust", 0, fetcher(&transport, 10)).unwrap();

    let mut stream = query.tweets();
    let tweets = drain(&mut stream).await;

    assert!(tweets.is_empty());
    match stream.termination() {
        Some(Termination::GaveUp { attempts, .. }) => assert_eq!(*attempts, 4),
        other => panic!("Expected GaveUp, got {other:?}"),
    }
    assert_eq!(transport.requests(), 4);
}

#[tokio::test]
async fn test_stream_permanent_failure_aborts() {
    let transport = Arc::new(
        FakeTransport::new()
            .with_query("rust", three_pages())
            .with_fault("rust", Fault::PermanentOnPage(1)),
    );
    let query = Query::new("rust", 0, fetcher(&transport, 10)).unwrap();

    let mut stream = query.tweets();
    assert!(stream.next().await.unwrap().is_some());
    assert!(stream.next().await.unwrap().is_some());

    let err = stream.next().await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 403, .. }));
    assert!(matches!(
        stream.termination(),
        Some(Termination::Aborted { .. })
    ));
    assert!(stream.next().await.unwrap().is_none());
    assert_eq!(transport.pages_requested("rust"), vec![0, 1]);
}

#[tokio::test]
async fn test_stream_stops_on_repeated_cursor() {
    let (transport, query) = stuck_query();

    let mut stream = query.tweets();
    stream.next().await.unwrap();
    stream.next().await.unwrap();
    stream.next().await.unwrap();
    assert_eq!(stream.phase(), StreamPhase::Draining);

    let rest = drain(&mut stream).await;
    assert_eq!(rest.len(), 1);
    assert_eq!(stream.termination(), Some(&Termination::Exhausted));
    assert_eq!(transport.requests.load(Ordering::SeqCst), 2);
    assert_eq!(stream.stats().records_skipped, 2);
}

#[tokio::test]
async fn test_stream_stops_on_cursor_cycle() {
    let transport = Arc::new(CyclingTransport {
        requests: AtomicUsize::new(0),
    });
    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let fetcher = crate::fetch::PageFetcher::new(
        dyn_transport,
        Arc::new(crate::decode::JsonPageParser::new()),
    );
    let query = Query::new("cycle", 0, fetcher).unwrap();

    let mut stream = query.tweets();
    let tweets = drain(&mut stream).await;

    assert_eq!(ids(&tweets), vec!["100", "99", "98"]);
    assert_eq!(transport.requests.load(Ordering::SeqCst), 3);
    assert_eq!(stream.termination(), Some(&Termination::Exhausted));
}

#[tokio::test]
async fn test_into_stream() {
    let transport = Arc::new(FakeTransport::new().with_query("rust", three_pages()));
    let query = Query::new("rust", 3, fetcher(&transport, 10)).unwrap();

    let results: Vec<_> = query.tweets().into_stream().collect().await;
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(std::result::Result::is_ok));
}

#[tokio::test]
async fn test_into_stream_ends_after_error() {
    let transport = Arc::new(
        FakeTransport::new()
            .with_query("rust", three_pages())
            .with_fault("rust", Fault::Permanent),
    );
    let query = Query::new("rust", 0, fetcher(&transport, 10)).unwrap();

    let results: Vec<_> = query.tweets().into_stream().collect().await;
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[tokio::test]
async fn test_concurrent_streams_respect_limiter() {
    let mut transport = FakeTransport::new().with_delay(Duration::from_millis(10));
    let names: Vec<String> = (0..6).map(|i| format!("q{i}")).collect();
    for name in &names {
        transport = transport.with_query(name, three_pages());
    }
    let transport = Arc::new(transport);
    let fetcher = fetcher(&transport, 2);

    let streams: Vec<TweetStream> = names
        .iter()
        .map(|name| Query::new(name, 0, fetcher.clone()).unwrap().tweets())
        .collect();
    let results =
        futures::future::join_all(streams.into_iter().map(TweetStream::collect_all)).await;

    for result in results {
        assert_eq!(result.unwrap().len(), 6);
    }
    assert!(transport.max_in_flight() <= 2);
    assert_eq!(fetcher.limiter().available(), 2);
}
