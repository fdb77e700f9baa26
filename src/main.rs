//! FX Market Pulse — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the two ingestion loops, their
//! caches, the polling scheduler, and the Prometheus exporter.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fx_market_pulse::api::{self, AppState};
use fx_market_pulse::cache::TtlCache;
use fx_market_pulse::config::AppConfig;
use fx_market_pulse::fx::browser::WebDriverBrowser;
use fx_market_pulse::fx::{FxIngestor, FxSettings};
use fx_market_pulse::metrics::Metrics;
use fx_market_pulse::news::fetch::FeedClient;
use fx_market_pulse::news::NewsIngestor;
use fx_market_pulse::scheduler::{spawn_poll_scheduler, PollSchedulerCfg};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fx_market_pulse=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load()?;
    let metrics = Metrics::init(cfg.fx.cache_ttl.as_secs(), cfg.news.cache_ttl.as_secs());

    // WebDriver HTTP calls get headroom beyond the per-navigation
    // bound so the loop-level timeout fires first.
    let browser = WebDriverBrowser::new(
        &cfg.fx.webdriver_url,
        &cfg.fx.symbol_url_template,
        cfg.fx.nav_timeout + Duration::from_secs(5),
    );
    let fx = Arc::new(FxIngestor::new(
        Box::new(browser),
        TtlCache::new(cfg.fx.cache_ttl),
        FxSettings {
            symbol_delay: cfg.fx.symbol_delay,
            nav_timeout: cfg.fx.nav_timeout,
            on_failure: cfg.fx.on_failure,
        },
    ));

    let news = Arc::new(NewsIngestor::new(
        Box::new(FeedClient::from_url(&cfg.news.feed_url)),
        TtlCache::new(cfg.news.cache_ttl),
        cfg.news.on_failure,
    ));

    let default_symbols = Arc::new(cfg.fx.default_symbols.clone());
    spawn_poll_scheduler(
        PollSchedulerCfg {
            interval_secs: cfg.poll_interval.as_secs(),
        },
        fx.clone(),
        news.clone(),
        default_symbols.clone(),
    );

    let state = AppState {
        fx,
        news,
        default_symbols,
    };
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "fx-market-pulse listening");
    axum::serve(listener, app).await?;
    Ok(())
}
