//! Search query module
//!
//! Validates search query strings and composes them from parts.
//!
//! # Grammar
//!
//! ```text
//! rust tokio          both words (space is AND)
//! "exact phrase"      exact match
//! rust OR go          either word
//! -spam               not containing the word
//! #rustlang           hashtag
//! from:alice          sent by an account
//! to:bob              replying to an account
//! @carol              mentioning an account
//! since:2020-01-01    on or after a date
//! until:2020-02-01    before a date
//! place:LOCATION_ID   from a location
//! ```
//!
//! The engine treats a validated query as opaque text; only structural
//! problems are rejected (empty query, unterminated quote, duplicate date
//! bounds, filters without a value).

mod builder;
mod types;

pub use builder::QueryBuilder;
pub use types::{Filter, SearchQuery, FILTER_PREFIXES};
