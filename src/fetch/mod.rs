//! Page fetching module
//!
//! One bounded, retryable request per page.
//!
//! # Overview
//!
//! - `Locator` - request URL plus which endpoint it targets
//! - `RetryPolicy` - retry budget and backoff between attempts
//! - `PageFetcher` - acquires a permit, requests, parses
//! - `FetchOutcome` - a parsed page, or the record of giving up
//!
//! Transient transport failures are retried until the budget runs out, at
//! which point the fetch reports `RetriesExhausted` instead of an error.
//! Every attempt holds its own permit and releases it before the next one.

mod fetcher;
mod types;

pub use fetcher::PageFetcher;
pub use types::{FetchOutcome, Locator, RetryPolicy};
