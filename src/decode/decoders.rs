//! Decoder implementations

use super::types::{PageKind, PageParser, ParsedPage};
use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::record::{Account, Tweet};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

// ============================================================================
// JSON Page Parser
// ============================================================================

/// Parser for JSON pages
///
/// ```json
/// { "min_position": "TWEET-2-1", "items": [ { "tweet_id": "2", ... }, ... ] }
/// ```
///
/// When the cursor field is missing from a first page, the cursor is built
/// from the ids on the page as `TWEET-{last_id}-{first_id}`.
#[derive(Debug, Clone)]
pub struct JsonPageParser {
    /// Dot path to the records array
    record_path: String,
    /// Dot path to the cursor
    cursor_path: Option<String>,
    /// Dot path to the record of a status response
    status_path: String,
    /// Dot path to the record of a profile response
    account_path: String,
}

impl Default for JsonPageParser {
    fn default() -> Self {
        Self::from_config(&ParserConfig::default())
    }
}

impl JsonPageParser {
    /// Create a parser with the default paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from config
    pub fn from_config(config: &ParserConfig) -> Self {
        Self {
            record_path: config.record_path.clone(),
            cursor_path: config.cursor_path.clone(),
            status_path: config.status_path.clone(),
            account_path: config.account_path.clone(),
        }
    }

    /// Set the record path
    #[must_use]
    pub fn with_record_path(mut self, path: impl Into<String>) -> Self {
        self.record_path = path.into();
        self
    }

    /// Set or clear the cursor path
    #[must_use]
    pub fn with_cursor_path(mut self, path: Option<String>) -> Self {
        self.cursor_path = path;
        self
    }

    fn extract_cursor(&self, value: &Value, tweets: &[Tweet], kind: PageKind) -> Option<String> {
        let from_body = self
            .cursor_path
            .as_deref()
            .and_then(|path| lookup(value, path))
            .and_then(|cursor| match cursor {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        match from_body {
            Some(cursor) => Some(cursor),
            None if kind.is_initial() => match (tweets.first(), tweets.last()) {
                (Some(first), Some(last)) => Some(format!(
                    "TWEET-{}-{}",
                    last.tweet_id(),
                    first.tweet_id()
                )),
                _ => None,
            },
            None => None,
        }
    }
}

impl PageParser for JsonPageParser {
    fn parse(&self, body: &str, kind: PageKind) -> Result<ParsedPage> {
        let value = parse_json(body)?;

        let items: &[Value] = match lookup(&value, &self.record_path) {
            Some(Value::Array(items)) => items.as_slice(),
            Some(Value::Null) | None => &[],
            Some(_) => {
                return Err(Error::decode(format!(
                    "'{}' is not an array",
                    self.record_path
                )))
            }
        };

        let mut tweets = Vec::with_capacity(items.len());
        let mut skipped = 0;
        for item in items {
            match serde_json::from_value::<Tweet>(item.clone()) {
                Ok(tweet) => tweets.push(tweet),
                Err(e) => {
                    debug!("Skipping malformed record: {e}");
                    skipped += 1;
                }
            }
        }

        if tweets.is_empty() {
            return Ok(ParsedPage {
                tweets,
                cursor: None,
                skipped,
            });
        }

        let cursor = self.extract_cursor(&value, &tweets, kind);
        Ok(ParsedPage {
            tweets,
            cursor,
            skipped,
        })
    }

    fn parse_status(&self, body: &str) -> Result<Tweet> {
        single_record(&parse_json(body)?, &self.status_path)
    }

    fn parse_account(&self, body: &str) -> Result<Account> {
        single_record(&parse_json(body)?, &self.account_path)
    }
}

fn parse_json(body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| Error::Decode {
        message: format!("Failed to parse JSON: {e}"),
    })
}

/// A page that holds exactly one record has nothing to skip to, so a
/// malformed record is an error.
fn single_record<T: DeserializeOwned>(value: &Value, path: &str) -> Result<T> {
    match lookup(value, path) {
        Some(record) if !record.is_null() => serde_json::from_value(record.clone())
            .map_err(|e| Error::decode(format!("Malformed record at '{path}': {e}"))),
        _ => Err(Error::decode(format!("No record at '{path}'"))),
    }
}

/// Follow a dot path like `data.items` (an optional `$.` prefix is ignored)
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match current {
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => current.get(part)?,
        };
    }
    Some(current)
}
