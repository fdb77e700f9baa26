// src/config.rs
//
// Runtime configuration: built-in defaults, overlaid by an optional
// TOML file, overlaid by environment variables. `.env` is loaded in
// `main` via dotenvy before this runs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_CONFIG_PATH: &str = "FX_PULSE_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config/fx-market-pulse.toml";

pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "EURUSD", "GBPUSD", "USDJPY", "USDCHF", "AUDUSD", "USDCAD", "NZDUSD", "EURJPY", "GBPJPY",
    "EURGBP",
];

/// What an ingestion loop serves when its source is entirely
/// unavailable. Decided once per source type: FX defaults to
/// `Synthesize` (price absence breaks downstream math), news to
/// `EmptyResult` (fabricated headlines are unacceptable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFailurePolicy {
    Synthesize,
    EmptyResult,
}

impl SourceFailurePolicy {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synthesize" => Some(Self::Synthesize),
            "empty" | "empty_result" => Some(Self::EmptyResult),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub poll_interval: Duration,
    pub fx: FxConfig,
    pub news: NewsConfig,
}

#[derive(Debug, Clone)]
pub struct FxConfig {
    pub cache_ttl: Duration,
    pub symbol_delay: Duration,
    pub nav_timeout: Duration,
    pub webdriver_url: String,
    pub symbol_url_template: String,
    pub on_failure: SourceFailurePolicy,
    pub default_symbols: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub cache_ttl: Duration,
    pub feed_url: String,
    pub on_failure: SourceFailurePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            poll_interval: Duration::from_secs(60),
            fx: FxConfig {
                cache_ttl: Duration::from_secs(30),
                symbol_delay: Duration::from_millis(1_500),
                nav_timeout: Duration::from_secs(15),
                webdriver_url: "http://127.0.0.1:9515".to_string(),
                symbol_url_template: "https://www.tradingview.com/symbols/{symbol}/".to_string(),
                on_failure: SourceFailurePolicy::Synthesize,
                default_symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            },
            news: NewsConfig {
                cache_ttl: Duration::from_secs(5 * 60),
                feed_url: "https://financialjuice.com/feed.ashx?xy=rss".to_string(),
                on_failure: SourceFailurePolicy::EmptyResult,
            },
        }
    }
}

/// Optional TOML overlay; every field may be omitted.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind_addr: Option<String>,
    poll_interval_secs: Option<u64>,
    #[serde(default)]
    fx: FxFileConfig,
    #[serde(default)]
    news: NewsFileConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FxFileConfig {
    cache_ttl_secs: Option<u64>,
    symbol_delay_ms: Option<u64>,
    nav_timeout_secs: Option<u64>,
    webdriver_url: Option<String>,
    symbol_url_template: Option<String>,
    on_failure: Option<SourceFailurePolicy>,
    default_symbols: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsFileConfig {
    cache_ttl_secs: Option<u64>,
    feed_url: Option<String>,
    on_failure: Option<SourceFailurePolicy>,
}

impl AppConfig {
    /// Defaults, then `$FX_PULSE_CONFIG_PATH` (or the conventional
    /// `config/fx-market-pulse.toml` when present), then env vars.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();

        let path = std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config from {path}"))?;
            let file: FileConfig =
                toml::from_str(&content).with_context(|| format!("parsing config {path}"))?;
            cfg.apply_file(file);
        }

        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.bind_addr {
            self.bind_addr = v;
        }
        if let Some(v) = file.poll_interval_secs {
            self.poll_interval = Duration::from_secs(v);
        }
        if let Some(v) = file.fx.cache_ttl_secs {
            self.fx.cache_ttl = Duration::from_secs(v);
        }
        if let Some(v) = file.fx.symbol_delay_ms {
            self.fx.symbol_delay = Duration::from_millis(v);
        }
        if let Some(v) = file.fx.nav_timeout_secs {
            self.fx.nav_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.fx.webdriver_url {
            self.fx.webdriver_url = v;
        }
        if let Some(v) = file.fx.symbol_url_template {
            self.fx.symbol_url_template = v;
        }
        if let Some(v) = file.fx.on_failure {
            self.fx.on_failure = v;
        }
        if let Some(v) = file.fx.default_symbols {
            if !v.is_empty() {
                self.fx.default_symbols = v;
            }
        }
        if let Some(v) = file.news.cache_ttl_secs {
            self.news.cache_ttl = Duration::from_secs(v);
        }
        if let Some(v) = file.news.feed_url {
            self.news.feed_url = v;
        }
        if let Some(v) = file.news.on_failure {
            self.news.on_failure = v;
        }
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_str("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = env_u64("POLL_INTERVAL_SECS") {
            self.poll_interval = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("FX_CACHE_TTL_SECS") {
            self.fx.cache_ttl = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("FX_SYMBOL_DELAY_MS") {
            self.fx.symbol_delay = Duration::from_millis(v);
        }
        if let Some(v) = env_u64("FX_NAV_TIMEOUT_SECS") {
            self.fx.nav_timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_str("WEBDRIVER_URL") {
            self.fx.webdriver_url = v;
        }
        if let Some(v) = env_str("FX_SYMBOL_URL_TEMPLATE") {
            self.fx.symbol_url_template = v;
        }
        if let Some(v) = env_policy("FX_ON_FAILURE") {
            self.fx.on_failure = v;
        }
        if let Some(v) = env_u64("NEWS_CACHE_TTL_SECS") {
            self.news.cache_ttl = Duration::from_secs(v);
        }
        if let Some(v) = env_str("NEWS_FEED_URL") {
            self.news.feed_url = v;
        }
        if let Some(v) = env_policy("NEWS_ON_FAILURE") {
            self.news.on_failure = v;
        }
    }
}

fn env_str(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(name: &str) -> Option<u64> {
    env_str(name).and_then(|v| v.trim().parse().ok())
}

fn env_policy(name: &str) -> Option<SourceFailurePolicy> {
    env_str(name).and_then(|v| SourceFailurePolicy::parse(&v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.fx.cache_ttl, Duration::from_secs(30));
        assert_eq!(cfg.fx.symbol_delay, Duration::from_millis(1_500));
        assert_eq!(cfg.fx.nav_timeout, Duration::from_secs(15));
        assert_eq!(cfg.news.cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.fx.default_symbols.len(), 10);
        assert_eq!(cfg.fx.on_failure, SourceFailurePolicy::Synthesize);
        assert_eq!(cfg.news.on_failure, SourceFailurePolicy::EmptyResult);
    }

    #[test]
    fn policy_parse_accepts_both_spellings() {
        assert_eq!(
            SourceFailurePolicy::parse("synthesize"),
            Some(SourceFailurePolicy::Synthesize)
        );
        assert_eq!(
            SourceFailurePolicy::parse("EMPTY"),
            Some(SourceFailurePolicy::EmptyResult)
        );
        assert_eq!(
            SourceFailurePolicy::parse("empty_result"),
            Some(SourceFailurePolicy::EmptyResult)
        );
        assert_eq!(SourceFailurePolicy::parse("whatever"), None);
    }

    #[test]
    fn toml_overlay_applies_partial_fields() {
        let toml = r#"
            poll_interval_secs = 90

            [fx]
            cache_ttl_secs = 10
            on_failure = "empty_result"

            [news]
            feed_url = "https://example.com/rss"
        "#;
        let file: FileConfig = toml::from_str(toml).unwrap();
        let mut cfg = AppConfig::default();
        cfg.apply_file(file);

        assert_eq!(cfg.poll_interval, Duration::from_secs(90));
        assert_eq!(cfg.fx.cache_ttl, Duration::from_secs(10));
        assert_eq!(cfg.fx.on_failure, SourceFailurePolicy::EmptyResult);
        assert_eq!(cfg.news.feed_url, "https://example.com/rss");
        // untouched fields keep their defaults
        assert_eq!(cfg.news.cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.fx.symbol_delay, Duration::from_millis(1_500));
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_win() {
        std::env::set_var("FX_CACHE_TTL_SECS", "7");
        std::env::set_var("NEWS_ON_FAILURE", "synthesize");
        let mut cfg = AppConfig::default();
        cfg.apply_env();
        std::env::remove_var("FX_CACHE_TTL_SECS");
        std::env::remove_var("NEWS_ON_FAILURE");

        assert_eq!(cfg.fx.cache_ttl, Duration::from_secs(7));
        assert_eq!(cfg.news.on_failure, SourceFailurePolicy::Synthesize);
    }
}
