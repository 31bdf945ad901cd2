// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # tweet-stream
//!
//! Lazy, bounded-concurrency streaming of paginated tweet searches.
//!
//! ## Features
//!
//! - **Cursor Pagination**: first page, then continuation pages until the source runs dry
//! - **Retry**: transient transport failures are retried per page, then absorbed
//! - **Shared Limiter**: one permit pool bounds in-flight requests across all queries
//! - **Chronological Merge**: several queries interleaved newest first, one record buffered per query
//! - **Termination Status**: every stream reports whether it ran dry, hit its limit, or gave up
//! - **Lookups**: single tweets by id and account profiles by username
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tweet_stream::{Queries, Query, ScraperConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ScraperConfig::default();
//!
//!     let query = Query::from_config("rust since:2020-01-01", &config)?;
//!     let mut stream = query.tweets();
//!     while let Some(tweet) = stream.next().await? {
//!         println!("{tweet}");
//!     }
//!     println!("ended: {:?}", stream.termination());
//!
//!     let queries = Queries::from_config(["#rustlang", "#golang"], &config)?;
//!     let mut merged = queries.tweets();
//!     while let Some(tweet) = merged.next().await? {
//!         println!("{tweet}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Queries ── KWayMerge (newest first, one head per stream)   │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┴───────────────────────────────┐
//! │  Query ── TweetStream (cursor state, limit, termination)    │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴──────┬────────────────────────┐
//! │  PageFetcher │ ConcurrencyLimiter  │ PageParser             │
//! │  retry       │ shared permits      │ JSON records + cursor  │
//! └──────┬───────┴─────────────────────┴────────────────────────┘
//!        │
//! ┌──────┴───────────────────────────────────────────────────────┐
//! │  Transport ── HttpTransport (reqwest, rate limit, timeout)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Scraper configuration and endpoint templates
pub mod config;

/// Query validation and composition
pub mod query;

/// The tweet record
pub mod record;

/// Page parsers
pub mod decode;

/// HTTP transport, rate limiting and the shared permit pool
pub mod http;

/// Single-page fetch with retry
pub mod fetch;

/// Single-query pagination
pub mod pagination;

/// Multi-query chronological merge
pub mod merge;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, ScraperConfig};
pub use fetch::{FetchOutcome, PageFetcher, RetryPolicy};
pub use http::ConcurrencyLimiter;
pub use merge::{KWayMerge, Queries, RecordSource};
pub use pagination::{Query, StreamPhase, Termination, TweetStream};
pub use query::{QueryBuilder, SearchQuery};
pub use record::{chronological_cmp, Account, Tweet};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
