// src/news/fetch.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::news::normalize_text;
use crate::news::types::{RawItem, MAX_FEED_ITEMS};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "category", default)]
    category: Vec<String>,
}

/// Raw-item source consumed by the news ingestion loop.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Most-recent-first as delivered by the feed, truncated to the
    /// first `MAX_FEED_ITEMS` entries. Transport or parse failure is
    /// an error for the loop to absorb; no synthetic news, ever.
    async fn fetch_raw(&self) -> Result<Vec<RawItem>>;
    fn name(&self) -> &'static str;
}

pub struct FeedClient {
    mode: Mode,
}

enum Mode {
    Http {
        url: String,
        client: reqwest::Client,
    },
    Fixture(String),
}

impl FeedClient {
    pub fn from_url(url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()
            .unwrap_or_default();
        Self {
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }

    /// Parse from captured XML content; used by tests.
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<RawItem>> {
        let t0 = std::time::Instant::now();
        let rss: Rss = from_str(s).context("parsing news feed xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len().min(MAX_FEED_ITEMS));
        for it in rss.channel.item.into_iter().take(MAX_FEED_ITEMS) {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(RawItem {
                title,
                summary: normalize_text(it.description.as_deref().unwrap_or_default()),
                link: it.link.filter(|l| !l.trim().is_empty()),
                published: it.pub_date,
                categories: it.category,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("news_parse_ms").record(ms);
        counter!("news_items_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl NewsSource for FeedClient {
    async fn fetch_raw(&self) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),

            Mode::Http { url, client } => {
                let body = match client.get(url).send().await {
                    Ok(resp) => resp.text().await.context("news feed .text()")?,
                    Err(e) => {
                        tracing::warn!(target: "news", error = ?e, "feed http error");
                        return Err(e).context("news feed get()");
                    }
                };
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Financial Juice"
    }
}
