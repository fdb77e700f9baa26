// src/news/types.rs
use chrono::{DateTime, Utc};

/// Fixed source literal stamped on every classified item.
pub const NEWS_SOURCE: &str = "Financial Juice";

/// Feed truncation bound; only the newest items are processed.
pub const MAX_FEED_ITEMS: usize = 20;

/// Summary excerpt bound in characters.
pub const SUMMARY_MAX_CHARS: usize = 200;

/// One feed entry as delivered, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub summary: String,
    pub link: Option<String>,
    /// Publish date as the feed printed it; parsed (with fallback to
    /// capture time) during classification.
    pub published: Option<String>,
    pub categories: Vec<String>,
}

/// Market-impact tier. Always exactly one of the three; MEDIUM is the
/// default for unmatched text, a policy choice rather than "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

/// One classified article. The whole collection is replaced, never
/// merged, on each successful fetch.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub impact_level: ImpactLevel,
    /// 3-letter codes in keyword-table order.
    pub currencies: Vec<String>,
    /// Derived from `currencies` and the fixed major-pair table; never
    /// set independently.
    pub pairs: Vec<String>,
    pub tags: Vec<String>,
    pub link: String,
}
