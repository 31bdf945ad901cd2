//! Record module
//!
//! The `Tweet` record produced by page parsers and consumed by the
//! paginator and the merger, plus the `Account` profile record.
//!
//! Records are ordered by an explicit comparator, [`chronological_cmp`],
//! rather than through `Ord`: timestamp first, tweet id second.

mod account;
mod tweet;

pub use account::Account;
pub use tweet::{chronological_cmp, Tweet};
