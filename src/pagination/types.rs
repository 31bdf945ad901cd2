//! Pagination types
//!
//! Cursor state, lifecycle phase and the termination record of one stream.

use std::collections::HashSet;
use std::fmt;

/// Where a stream is in its fetch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamPhase {
    /// No page fetched yet
    FirstPage,
    /// A continuation cursor is held; the next fetch targets it
    HasMore,
    /// The last page is fetched; buffered records remain
    Draining,
    /// Nothing more will be yielded
    Finished,
}

impl fmt::Display for StreamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FirstPage => "first_page",
            Self::HasMore => "has_more",
            Self::Draining => "draining",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Why a stream stopped yielding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The source returned an empty page or no new cursor
    Exhausted,
    /// The emission limit was reached
    LimitReached,
    /// A page failed transiently on every attempt
    GaveUp {
        /// Attempts made for the failing page
        attempts: u32,
        /// Description of the last failure
        last_error: String,
    },
    /// A permanent failure was returned to the consumer
    Aborted {
        /// Description of the failure
        error: String,
    },
}

impl Termination {
    /// Check if the stream ended because of a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::GaveUp { .. } | Self::Aborted { .. })
    }

    /// Check if re-driving the stream could yield more records
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::GaveUp { .. })
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("exhausted"),
            Self::LimitReached => f.write_str("limit reached"),
            Self::GaveUp {
                attempts,
                last_error,
            } => write!(f, "gave up after {attempts} attempts: {last_error}"),
            Self::Aborted { error } => write!(f, "aborted: {error}"),
        }
    }
}

/// Per-stream cursor and emission count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Continuation cursor for the next page
    pub cursor: Option<String>,
    /// Records yielded so far
    pub emitted: usize,
    /// Emission limit, 0 for unbounded
    pub limit: usize,
    /// Whether the first page has been requested
    pub started: bool,
    /// Every cursor followed so far
    seen: HashSet<String>,
}

impl PaginationState {
    /// Create state for a stream with the given limit
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Check if no more records may be yielded
    pub fn limit_reached(&self) -> bool {
        self.limit > 0 && self.emitted >= self.limit
    }

    /// Count one yielded record
    pub fn record_emitted(&mut self) {
        self.emitted += 1;
    }

    /// Record the cursor returned with a page.
    ///
    /// Returns false when the stream cannot continue: no cursor, or a
    /// cursor that was already followed (the source is cycling).
    pub fn advance(&mut self, cursor: Option<String>) -> bool {
        self.started = true;
        match cursor {
            Some(next) if self.seen.insert(next.clone()) => {
                self.cursor = Some(next);
                true
            }
            _ => false,
        }
    }
}

/// Counters for one stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Page requests that produced a result, including empty pages
    pub pages_fetched: usize,
    /// Records yielded to the consumer
    pub records_emitted: usize,
    /// Records the parser skipped as malformed
    pub records_skipped: usize,
}
