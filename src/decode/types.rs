//! Decoder types and traits

use crate::error::Result;
use crate::record::{Account, Tweet};

/// Which endpoint produced a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// First page of a query (no cursor)
    Initial,
    /// Page fetched with a continuation cursor
    Continuation,
}

impl PageKind {
    /// Check if this is the first page
    pub fn is_initial(self) -> bool {
        matches!(self, Self::Initial)
    }
}

/// Records and continuation cursor extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Records in page order
    pub tweets: Vec<Tweet>,
    /// Cursor for the next page; `None` means the stream is exhausted
    pub cursor: Option<String>,
    /// Number of malformed records that were skipped
    pub skipped: usize,
}

impl ParsedPage {
    /// Create a page
    pub fn new(tweets: Vec<Tweet>, cursor: Option<String>) -> Self {
        Self {
            tweets,
            cursor,
            skipped: 0,
        }
    }

    /// A page with nothing on it
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if the page has no records
    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }

    /// Number of records on the page
    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    /// Check if another page can be requested
    pub fn has_more(&self) -> bool {
        !self.tweets.is_empty() && self.cursor.is_some()
    }
}

/// Trait for parsing raw page content into records
pub trait PageParser: Send + Sync {
    /// Parse one page
    fn parse(&self, body: &str, kind: PageKind) -> Result<ParsedPage>;

    /// Parse a single-status page into its tweet
    fn parse_status(&self, body: &str) -> Result<Tweet>;

    /// Parse a profile page
    fn parse_account(&self, body: &str) -> Result<Account>;
}
