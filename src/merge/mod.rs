//! Multi-query merge module
//!
//! Interleaves several tweet streams, newest first, without buffering more
//! than one record per stream.
//!
//! # Overview
//!
//! - `RecordSource` - pull capability the merge drives
//! - `KWayMerge` - generic streaming merge over pre-sorted sources
//! - `Queries` - several queries sharing one limiter and one limit

mod kway;
mod queries;
mod types;

pub use kway::{KWayMerge, MergedStream};
pub use queries::{ChronologicalMerge, Queries};
pub use types::RecordSource;
