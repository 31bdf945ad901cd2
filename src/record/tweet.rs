//! Tweet record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single search result.
///
/// Identity is the tweet id: two values with the same id compare equal and
/// hash the same, which lets callers drop duplicates that show up across
/// page boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    #[serde(deserialize_with = "string_or_number")]
    tweet_id: String,
    user: String,
    #[serde(default)]
    fullname: String,
    #[serde(default)]
    url: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    text: String,
    #[serde(default, deserialize_with = "count")]
    replies: u64,
    #[serde(default, deserialize_with = "count")]
    retweets: u64,
    #[serde(default, deserialize_with = "count")]
    likes: u64,
}

impl Tweet {
    /// Create a tweet with the required fields
    pub fn new(
        tweet_id: impl Into<String>,
        user: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            tweet_id: tweet_id.into(),
            user: user.into(),
            fullname: String::new(),
            url: String::new(),
            timestamp,
            text: String::new(),
            replies: 0,
            retweets: 0,
            likes: 0,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = fullname.into();
        self
    }

    /// Set the permalink path
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set reply, retweet and like counts
    #[must_use]
    pub fn with_counts(mut self, replies: u64, retweets: u64, likes: u64) -> Self {
        self.replies = replies;
        self.retweets = retweets;
        self.likes = likes;
        self
    }

    pub fn tweet_id(&self) -> &str {
        &self.tweet_id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn replies(&self) -> u64 {
        self.replies
    }

    pub fn retweets(&self) -> u64 {
        self.retweets
    }

    pub fn likes(&self) -> u64 {
        self.likes
    }

    /// Words of the text starting with `#`
    pub fn hashtags(&self) -> Vec<&str> {
        self.text
            .split_whitespace()
            .filter(|word| word.starts_with('#'))
            .collect()
    }
}

impl PartialEq for Tweet {
    fn eq(&self, other: &Self) -> bool {
        self.tweet_id == other.tweet_id
    }
}

impl Eq for Tweet {}

impl Hash for Tweet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tweet_id.hash(state);
    }
}

impl fmt::Display for Tweet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tweet from {} on {}",
            self.user,
            self.timestamp.format("%Y-%m-%d")
        )
    }
}

/// Chronological order: timestamp, then tweet id.
///
/// Ids compare numerically when both are numeric so that `"9"` sorts
/// before `"10"`.
pub fn chronological_cmp(a: &Tweet, b: &Tweet) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| compare_ids(&a.tweet_id, &b.tweet_id))
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u128>(), b.parse::<u128>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

/// Counts arrive either as numbers or as numeric strings; blanks mean zero.
pub(super) fn count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(0),
        Some(StringOrNumber::Number(n)) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid count: {n}"))),
        Some(StringOrNumber::String(s)) if s.trim().is_empty() => Ok(0),
        Some(StringOrNumber::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid count: {s}"))),
    }
}
