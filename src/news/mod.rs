// src/news/mod.rs
pub mod classify;
pub mod fetch;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::cache::TtlCache;
use crate::config::SourceFailurePolicy;
use crate::news::fetch::NewsSource;
use crate::news::types::{NewsItem, RawItem, NEWS_SOURCE, SUMMARY_MAX_CHARS};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_items_total", "Raw items parsed from the feed.");
        describe_counter!("news_kept_total", "Items surviving classification.");
        describe_counter!("news_dropped_total", "Items dropped during classification.");
        describe_counter!("news_feed_errors_total", "Feed fetch/parse errors.");
        describe_counter!("news_batches_total", "Completed news batches.");
        describe_histogram!("news_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Normalize feed text: entity decode, strip tags, collapse
/// whitespace, trim stray punctuation.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Strip trailing sentence punctuation (keep quotes)
    while let Some(last) = out.chars().last() {
        if matches!(last, '!' | '?' | '.' | ',') {
            out.pop();
        } else {
            break;
        }
    }

    out
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(ts.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Turn one raw feed entry into a classified item. Returns `None` for
/// items with nothing to classify; the loop drops those silently.
pub fn process_item(raw: &RawItem, captured_at: DateTime<Utc>) -> Option<NewsItem> {
    let title = raw.title.trim();
    if title.is_empty() {
        return None;
    }

    let classification = classify::classify(title, &raw.summary);

    // Feed dates are RFC 2822; anything unparseable (or absent) falls
    // back to capture time.
    let published_at = raw
        .published
        .as_deref()
        .and_then(parse_rfc2822)
        .unwrap_or(captured_at);

    let summary: String = raw.summary.chars().take(SUMMARY_MAX_CHARS).collect();

    Some(NewsItem {
        id: classify::derive_id(title, raw.link.as_deref()),
        title: title.to_string(),
        summary,
        source: NEWS_SOURCE.to_string(),
        published_at,
        impact_level: classification.impact_level,
        currencies: classification.currencies,
        pairs: classification.pairs,
        tags: classification.tags,
        link: raw.link.clone().unwrap_or_default(),
    })
}

pub struct NewsIngestor {
    feed: Box<dyn NewsSource>,
    cache: TtlCache<Vec<NewsItem>>,
    on_failure: SourceFailurePolicy,
}

impl NewsIngestor {
    pub fn new(
        feed: Box<dyn NewsSource>,
        cache: TtlCache<Vec<NewsItem>>,
        on_failure: SourceFailurePolicy,
    ) -> Self {
        Self {
            feed,
            cache,
            on_failure,
        }
    }

    /// Classified items, most-recent-first, plus whether they came
    /// from the cache. On feed failure the cache is left untouched
    /// (a previous payload is never erased by an empty result).
    pub async fn get_news(&self) -> (Vec<NewsItem>, bool) {
        ensure_metrics_described();

        if let Some(items) = self.cache.read_fresh() {
            tracing::debug!(target: "news", count = items.len(), "serving cached news");
            return (items, true);
        }

        let raw = match self.feed.fetch_raw().await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(target: "news", error = ?e, provider = self.feed.name(), "feed unavailable");
                counter!("news_feed_errors_total").increment(1);
                // Fabricated headlines are a different risk than
                // fabricated prices: never synthesize news. The
                // "synthesize" policy degrades to serving the last
                // payload even when stale.
                return match self.on_failure {
                    SourceFailurePolicy::Synthesize => {
                        let stale = self.cache.read().map(|(p, _)| p).unwrap_or_default();
                        (stale, false)
                    }
                    SourceFailurePolicy::EmptyResult => (Vec::new(), false),
                };
            }
        };

        let captured_at = Utc::now();
        let total = raw.len();
        let items: Vec<NewsItem> = raw
            .iter()
            .filter_map(|r| process_item(r, captured_at))
            .collect();

        counter!("news_kept_total").increment(items.len() as u64);
        counter!("news_dropped_total").increment((total - items.len()) as u64);
        counter!("news_batches_total").increment(1);
        tracing::info!(target: "news", kept = items.len(), dropped = total - items.len(), "news batch processed");

        self.cache.write(items.clone());
        (items, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::types::ImpactLevel;

    fn raw(title: &str, summary: &str) -> RawItem {
        RawItem {
            title: title.to_string(),
            summary: summary.to_string(),
            link: Some("https://example.com/a".to_string()),
            published: Some("Mon, 24 Aug 2026 12:00:00 GMT".to_string()),
            categories: Vec::new(),
        }
    }

    #[test]
    fn normalize_collapses_ws_and_trailing_punct() {
        let s = "  ECB holds,&nbsp;&nbsp; markets shrug!!!  ";
        assert_eq!(normalize_text(s), "ECB holds, markets shrug");
    }

    #[test]
    fn process_item_parses_feed_date() {
        let captured = Utc::now();
        let item = process_item(&raw("Fed holds rates", ""), captured).unwrap();
        assert_eq!(item.published_at.to_rfc3339(), "2026-08-24T12:00:00+00:00");
        assert_eq!(item.impact_level, ImpactLevel::High);
        assert_eq!(item.source, NEWS_SOURCE);
    }

    #[test]
    fn bad_date_falls_back_to_capture_time() {
        let captured = Utc::now();
        let mut r = raw("Quiet session", "");
        r.published = Some("not a date".to_string());
        let item = process_item(&r, captured).unwrap();
        assert_eq!(item.published_at, captured);

        r.published = None;
        let item = process_item(&r, captured).unwrap();
        assert_eq!(item.published_at, captured);
    }

    #[test]
    fn summary_is_capped_at_two_hundred_chars() {
        let long = "x".repeat(500);
        let item = process_item(&raw("Title here", &long), Utc::now()).unwrap();
        assert_eq!(item.summary.chars().count(), SUMMARY_MAX_CHARS);
    }

    #[test]
    fn empty_title_is_dropped() {
        let mut r = raw("", "body");
        r.title = "   ".to_string();
        assert!(process_item(&r, Utc::now()).is_none());
    }
}
