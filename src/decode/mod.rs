//! Page decoding module
//!
//! Turns one page of raw response content into records plus an opaque
//! continuation cursor.
//!
//! # Overview
//!
//! - `PageParser` - the parsing boundary used by the page fetcher
//! - `JsonPageParser` - default parser for JSON pages
//!
//! Parsers must not fail on a single malformed record: such records are
//! skipped and counted. Only a page that cannot be read at all is an error.

mod decoders;
mod types;

pub use decoders::JsonPageParser;
pub use types::{PageKind, PageParser, ParsedPage};
