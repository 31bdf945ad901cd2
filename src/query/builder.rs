//! Query builder
//!
//! Composes a search query from typed parts and validates the result.

use super::types::SearchQuery;
use crate::error::Result;
use chrono::NaiveDate;

/// Builder for search queries
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    terms: Vec<String>,
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
}

impl QueryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a word
    #[must_use]
    pub fn word(mut self, word: impl Into<String>) -> Self {
        self.terms.push(word.into());
        self
    }

    /// Require an exact phrase
    #[must_use]
    pub fn phrase(mut self, phrase: impl AsRef<str>) -> Self {
        self.terms.push(format!("\"{}\"", phrase.as_ref().replace('"', "")));
        self
    }

    /// Require at least one of the given words
    #[must_use]
    pub fn any_of<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if !words.is_empty() {
            self.terms.push(words.join(" OR "));
        }
        self
    }

    /// Exclude a word
    #[must_use]
    pub fn exclude(mut self, word: impl AsRef<str>) -> Self {
        self.terms.push(format!("-{}", word.as_ref()));
        self
    }

    /// Require a hashtag (with or without the leading `#`)
    #[must_use]
    pub fn hashtag(mut self, tag: impl AsRef<str>) -> Self {
        self.terms
            .push(format!("#{}", tag.as_ref().trim_start_matches('#')));
        self
    }

    /// Only tweets sent by this account
    #[must_use]
    pub fn from_user(mut self, user: impl AsRef<str>) -> Self {
        self.terms
            .push(format!("from:{}", user.as_ref().trim_start_matches('@')));
        self
    }

    /// Only tweets replying to this account
    #[must_use]
    pub fn to_user(mut self, user: impl AsRef<str>) -> Self {
        self.terms
            .push(format!("to:{}", user.as_ref().trim_start_matches('@')));
        self
    }

    /// Only tweets mentioning this account
    #[must_use]
    pub fn mentions(mut self, user: impl AsRef<str>) -> Self {
        self.terms
            .push(format!("@{}", user.as_ref().trim_start_matches('@')));
        self
    }

    /// Only tweets from this location id
    #[must_use]
    pub fn place(mut self, place_id: impl AsRef<str>) -> Self {
        self.terms.push(format!("place:{}", place_id.as_ref()));
        self
    }

    /// Lower date bound; a later call replaces an earlier one
    #[must_use]
    pub fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    /// Upper date bound; a later call replaces an earlier one
    #[must_use]
    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    /// Render and validate the query
    pub fn build(self) -> Result<SearchQuery> {
        let mut terms = self.terms;
        if let Some(since) = self.since {
            terms.push(format!("since:{}", since.format("%Y-%m-%d")));
        }
        if let Some(until) = self.until {
            terms.push(format!("until:{}", until.format("%Y-%m-%d")));
        }
        SearchQuery::parse(&terms.join(" "))
    }
}
