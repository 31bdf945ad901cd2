//! Merge source abstraction

use crate::error::Result;
use crate::pagination::TweetStream;
use crate::record::Tweet;
use async_trait::async_trait;

/// A pull-based sequence the merge can drive.
///
/// `Ok(None)` means the source has ended; it must keep returning `Ok(None)`
/// afterwards.
#[async_trait]
pub trait RecordSource: Send {
    /// Record type produced
    type Item: Send;

    /// Pull the next record
    async fn next_record(&mut self) -> Result<Option<Self::Item>>;
}

#[async_trait]
impl RecordSource for TweetStream {
    type Item = Tweet;

    async fn next_record(&mut self) -> Result<Option<Tweet>> {
        self.next().await
    }
}
