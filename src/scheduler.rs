// src/scheduler.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::fx::FxIngestor;
use crate::news::NewsIngestor;

#[derive(Clone, Copy, Debug)]
pub struct PollSchedulerCfg {
    pub interval_secs: u64,
}

/// Spawn the polling driver that keeps both caches warm. A tick that
/// fires while the previous one is still running is skipped, not
/// queued; the pipeline assumes at most one in-flight invocation per
/// loop and does not lock internally.
pub fn spawn_poll_scheduler(
    cfg: PollSchedulerCfg,
    fx: Arc<FxIngestor>,
    news: Arc<NewsIngestor>,
    symbols: Arc<Vec<String>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let in_flight = Arc::new(AtomicBool::new(false));
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(cfg.interval_secs));
        loop {
            ticker.tick().await;

            if in_flight.swap(true, Ordering::SeqCst) {
                counter!("poll_ticks_skipped_total").increment(1);
                tracing::debug!(target: "scheduler", "previous poll still running, skipping tick");
                continue;
            }

            let guard = in_flight.clone();
            let fx = fx.clone();
            let news = news.clone();
            let symbols = symbols.clone();
            tokio::spawn(async move {
                let (quotes, fx_cached) = fx.get_quotes(&symbols).await;
                let (items, news_cached) = news.get_news().await;

                counter!("poll_ticks_total").increment(1);
                tracing::info!(
                    target: "scheduler",
                    quotes = quotes.len(),
                    fx_cached,
                    news = items.len(),
                    news_cached,
                    "poll tick finished"
                );
                guard.store(false, Ordering::SeqCst);
            });
        }
    })
}
