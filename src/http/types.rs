//! Transport trait

use crate::error::Result;
use async_trait::async_trait;
use url::Url;

/// Performs a single request for a page.
///
/// Connection-level faults must be reported as errors for which
/// [`Error::is_transient`](crate::Error::is_transient) returns `true`;
/// anything else is treated as permanent.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the raw page body at `url`
    async fn get(&self, url: &Url) -> Result<String>;
}
