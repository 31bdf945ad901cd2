//! Validated search query

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Filter prefixes understood by the remote search
pub const FILTER_PREFIXES: [&str; 5] = ["from:", "to:", "since:", "until:", "place:"];

/// A negated or plain phrase, or a run of non-space characters
static TERM: Lazy<Regex> = Lazy::new(|| Regex::new(r#"-?"[^"]*"|\S+"#).expect("valid regex"));

/// A recognized filter term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Prefix including the colon, e.g. `since:`
    pub prefix: &'static str,
    /// Value after the prefix
    pub value: String,
    /// Whether the term was negated with a leading `-`
    pub negated: bool,
}

/// A search query that passed structural validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    terms: Vec<String>,
}

impl SearchQuery {
    /// Validate a query string
    pub fn parse(query: &str) -> Result<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_query(query, "query is empty"));
        }

        let terms: Vec<String> = TERM
            .find_iter(trimmed)
            .map(|m| m.as_str().to_string())
            .collect();

        for term in &terms {
            let body = term.strip_prefix('-').unwrap_or(term);
            if body.starts_with('"') && (body.len() < 2 || !body.ends_with('"')) {
                return Err(Error::invalid_query(query, "unterminated quoted phrase"));
            }
        }

        let parsed = Self {
            raw: trimmed.to_string(),
            terms,
        };

        for filter in parsed.filters() {
            if filter.value.is_empty() {
                return Err(Error::invalid_query(
                    query,
                    format!("'{}' filter has no value", filter.prefix),
                ));
            }
        }

        for prefix in ["since:", "until:"] {
            let count = parsed.filters().filter(|f| f.prefix == prefix).count();
            if count > 1 {
                return Err(Error::invalid_query(
                    query,
                    format!("more than one '{prefix}' filter"),
                ));
            }
        }

        Ok(parsed)
    }

    /// The query text, trimmed
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Space-separated terms; quoted phrases are single terms
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Recognized filter terms, in query order
    pub fn filters(&self) -> impl Iterator<Item = Filter> + '_ {
        self.terms.iter().filter_map(|term| {
            let (negated, body) = match term.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, term.as_str()),
            };
            FILTER_PREFIXES.iter().copied().find_map(|prefix| {
                body.strip_prefix(prefix).map(|value| Filter {
                    prefix,
                    value: value.to_string(),
                    negated,
                })
            })
        })
    }

    /// Value of the first filter with this prefix
    pub fn filter(&self, prefix: &str) -> Option<String> {
        self.filters()
            .find(|f| f.prefix == prefix && !f.negated)
            .map(|f| f.value)
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for SearchQuery {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for SearchQuery {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for SearchQuery {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}
