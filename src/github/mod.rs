pub mod cache;
pub mod client;

use crate::error::{Result, TrendingError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A repository returned by the trending search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Identifier in `owner/name` form
    pub full_name: String,
    /// Display name
    pub name: String,
    /// Owner login
    pub owner: String,
    /// Owner profile URL
    #[serde(default)]
    pub owner_url: String,
    /// Star count
    pub stars: u64,
    /// Fork count
    pub forks: u64,
    /// Primary language, if GitHub detected one
    pub language: Option<String>,
    /// Repository description
    pub description: Option<String>,
    /// Repository web URL
    pub html_url: String,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last push time
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    /// AI-generated summary, if one was produced
    #[serde(default)]
    pub ai_summary: Option<String>,
}

impl Repository {
    /// Whether the repository was created or pushed to inside the window
    pub fn active_within(&self, window: &Window) -> bool {
        [self.created_at, self.pushed_at]
            .iter()
            .flatten()
            .any(|at| window.contains(at))
    }

    /// Language label used for grouping
    pub fn language_label(&self) -> &str {
        self.language.as_deref().unwrap_or(UNKNOWN_LANGUAGE)
    }
}

/// Bucket name for repositories without a detected language
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Lookback window for the trending search
#[derive(Debug, Clone)]
pub struct Window {
    /// Number of days looked back
    pub days: u32,
    /// Start of the window (inclusive)
    pub start: DateTime<Utc>,
    /// End of the window (inclusive)
    pub end: DateTime<Utc>,
}

impl Window {
    /// Create a window ending now
    pub fn days_back(days: u32) -> Result<Self> {
        Self::days_back_from(Utc::now(), days)
    }

    /// Create a window ending at `end`; fails when the start is not representable
    pub fn days_back_from(end: DateTime<Utc>, days: u32) -> Result<Self> {
        let start = end
            .checked_sub_signed(Duration::days(days as i64))
            .ok_or_else(|| TrendingError::config(format!("{} days back is out of range", days)))?;
        Ok(Self { days, start, end })
    }

    /// Check if a timestamp is within this window
    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        date >= &self.start && date <= &self.end
    }

    /// Search qualifier value, e.g. `2025-07-24T15:48:57Z`
    pub fn since_param(&self) -> String {
        self.start.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Stable sort by stars, highest first; equal counts keep fetch order
pub fn rank_by_stars(repos: &mut [Repository]) {
    repos.sort_by(|a, b| b.stars.cmp(&a.stars));
}
