//! Chronological merge over several queries

use super::kway::KWayMerge;
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::pagination::{Query, TweetStream};
use crate::query::SearchQuery;
use crate::record::{chronological_cmp, Tweet};
use std::cmp::Ordering;

/// Newest-first merge of tweet streams
pub type ChronologicalMerge = KWayMerge<TweetStream, fn(&Tweet, &Tweet) -> Ordering>;

/// Several queries merged into one newest-first sequence.
///
/// The limit applies to each query separately, not to the merged total. All
/// queries share the fetcher's permit pool.
#[derive(Debug, Clone)]
pub struct Queries {
    queries: Vec<Query>,
    limit: usize,
}

impl Queries {
    /// Validate every query string. Fails on the first invalid one.
    pub fn new<I, Q>(queries: I, limit: usize, fetcher: PageFetcher) -> Result<Self>
    where
        I: IntoIterator<Item = Q>,
        Q: AsRef<str>,
    {
        let queries = queries
            .into_iter()
            .map(|q| SearchQuery::parse(q.as_ref()))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .map(|q| Query::from_search(q, limit, fetcher.clone()))
            .collect();

        Ok(Self { queries, limit })
    }

    /// Build with one shared fetcher and the configured default limit
    pub fn from_config<I, Q>(queries: I, config: &ScraperConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Q>,
        Q: AsRef<str>,
    {
        let fetcher = PageFetcher::from_config(config)?;
        Self::new(queries, config.default_limit, fetcher)
    }

    /// The individual queries
    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// Per-query emission limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Start a fresh merge over new streams of every query
    pub fn tweets(&self) -> ChronologicalMerge {
        let streams = self.queries.iter().map(Query::tweets).collect();
        KWayMerge::new(streams, chronological_cmp as fn(&Tweet, &Tweet) -> Ordering)
    }
}
