//! News list models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of `news_macro.json`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    #[serde(deserialize_with = "crate::utils::null_as_default")]
    pub title: String,
    pub source: Option<String>,
    /// Publication time as delivered; several formats occur in the wild
    #[serde(deserialize_with = "crate::utils::null_as_default")]
    pub published: String,
    pub published_ts: Option<i64>,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub image: Option<String>,
}

impl NewsItem {
    pub fn source_or_default(&self) -> &str {
        self.source.as_deref().filter(|s| !s.is_empty()).unwrap_or("-")
    }
}

/// A news item whose publication time parsed successfully
#[derive(Debug, Clone, PartialEq)]
pub struct DatedNewsItem {
    pub published_at: DateTime<Utc>,
    pub item: NewsItem,
}
