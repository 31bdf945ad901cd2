//! Pagination module
//!
//! Drives one query through its pages: first page, then continuation pages
//! until the source runs dry, a fetch gives up, or the emission limit is hit.
//!
//! # Overview
//!
//! - `Query` - a validated query string plus emission limit
//! - `TweetStream` - lazy pull-based sequence over one query
//! - `Termination` - why a stream ended, readable after the fact
//!
//! Transient failures never reach the consumer. A stream whose fetch gave up
//! ends cleanly and reports `Termination::GaveUp`.

mod stream;
mod types;

pub use stream::{Query, TweetResultStream, TweetStream};
pub use types::{PaginationState, StreamPhase, StreamStats, Termination};

#[cfg(test)]
mod tests;
