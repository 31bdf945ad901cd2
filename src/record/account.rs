//! Account profile record

use super::tweet::count;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public profile of one account.
///
/// Counters that the profile page leaves blank or omits read as zero; text
/// fields read as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Handle without the leading `@`
    pub user: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default, deserialize_with = "count")]
    pub tweets: u64,
    #[serde(default, deserialize_with = "count")]
    pub following: u64,
    #[serde(default, deserialize_with = "count")]
    pub followers: u64,
    #[serde(default, deserialize_with = "count")]
    pub likes: u64,
    #[serde(default, deserialize_with = "count")]
    pub lists: u64,
    #[serde(default, deserialize_with = "count")]
    pub moments: u64,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    /// Place id usable with the `place:` search filter
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub website: String,
    /// Year of birth, when the profile shows one
    #[serde(default, alias = "birthday")]
    pub birth_year: Option<i32>,
    /// Account creation time
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub joined: Option<DateTime<Utc>>,
}

impl Account {
    /// Create an account with only a handle
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            fullname: String::new(),
            tweets: 0,
            following: 0,
            followers: 0,
            likes: 0,
            lists: 0,
            moments: 0,
            bio: String::new(),
            location: String::new(),
            location_id: String::new(),
            website: String::new(),
            birth_year: None,
            joined: None,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = fullname.into();
        self
    }

    /// Search query for this account's own tweets
    pub fn timeline_query(&self) -> String {
        format!("from:{}", self.user)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{}", self.fullname, self.user)
    }
}
