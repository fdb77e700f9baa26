// src/fx/mod.rs
pub mod browser;
pub mod extract;
pub mod synth;
pub mod types;

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;

use crate::cache::TtlCache;
use crate::config::SourceFailurePolicy;
use crate::fx::browser::{QuoteBrowser, QuoteSession};
use crate::fx::extract::ExtractedFields;
use crate::fx::types::{Quote, QuoteBatch};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fx_quotes_live_total", "Quotes built from live extraction.");
        describe_counter!(
            "fx_quotes_synthetic_total",
            "Quotes degraded to synthetic values."
        );
        describe_counter!("fx_batches_total", "Completed FX quote batches.");
        describe_counter!(
            "fx_session_errors_total",
            "Browser sessions that failed to start."
        );
        describe_histogram!("fx_batch_ms", "Wall time per FX batch in milliseconds.");
    });
}

/// Tunables for the per-symbol scraping loop.
#[derive(Debug, Clone, Copy)]
pub struct FxSettings {
    /// Pause between symbols; intentional pacing against the upstream
    /// site, not a performance knob.
    pub symbol_delay: Duration,
    /// Bound on a single navigate + extract pass.
    pub nav_timeout: Duration,
    pub on_failure: SourceFailurePolicy,
}

pub struct FxIngestor {
    browser: Box<dyn QuoteBrowser>,
    cache: TtlCache<QuoteBatch>,
    settings: FxSettings,
}

impl FxIngestor {
    pub fn new(
        browser: Box<dyn QuoteBrowser>,
        cache: TtlCache<QuoteBatch>,
        settings: FxSettings,
    ) -> Self {
        Self {
            browser,
            cache,
            settings,
        }
    }

    /// Returns exactly one quote per requested symbol, in request
    /// order, plus whether the batch came from the cache. A symbol
    /// that cannot be measured gets a synthetic quote, never an
    /// absent entry.
    pub async fn get_quotes(&self, symbols: &[String]) -> (Vec<Quote>, bool) {
        ensure_metrics_described();

        // Cache hit only when the symbol list (order included) matches
        // the one that produced the cached batch.
        if let Some(batch) = self.cache.read_fresh() {
            if batch.symbols == symbols {
                tracing::debug!(target: "fx", count = batch.quotes.len(), "serving cached batch");
                return (batch.quotes, true);
            }
        }

        let t0 = std::time::Instant::now();

        let mut session = match self.browser.start_session().await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(target: "fx", error = ?e, "browser session unavailable");
                counter!("fx_session_errors_total").increment(1);
                return match self.settings.on_failure {
                    SourceFailurePolicy::Synthesize => {
                        let quotes: Vec<Quote> =
                            symbols.iter().map(|s| synth::synthesize(s)).collect();
                        counter!("fx_quotes_synthetic_total").increment(quotes.len() as u64);
                        (quotes, false)
                    }
                    SourceFailurePolicy::EmptyResult => (Vec::new(), false),
                };
            }
        };

        let mut quotes = Vec::with_capacity(symbols.len());
        for (i, symbol) in symbols.iter().enumerate() {
            let fields = self.scrape_one(&mut session, symbol).await;
            if fields.price.is_some() && fields.change_percent.is_some() {
                counter!("fx_quotes_live_total").increment(1);
            } else {
                counter!("fx_quotes_synthetic_total").increment(1);
            }
            quotes.push(synth::build_quote(symbol, fields));

            // Rate-limit pacing between symbols; deliberately
            // sequential to avoid tripping anti-scraping defenses.
            if i + 1 < symbols.len() {
                tokio::time::sleep(self.settings.symbol_delay).await;
            }
        }

        if let Err(e) = session.close().await {
            tracing::warn!(target: "fx", error = ?e, "browser session close failed");
        }

        histogram!("fx_batch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("fx_batches_total").increment(1);

        self.cache.write(QuoteBatch {
            symbols: symbols.to_vec(),
            quotes: quotes.clone(),
        });

        (quotes, false)
    }

    /// Navigate + extract for one symbol under the per-navigation
    /// timeout. Every failure mode (navigation error, timeout,
    /// selector absence) collapses to "fields absent" so the batch
    /// never aborts on a single symbol.
    async fn scrape_one(
        &self,
        session: &mut Box<dyn QuoteSession>,
        symbol: &str,
    ) -> ExtractedFields {
        let attempt = async {
            session.open_symbol(symbol).await?;
            anyhow::Ok(extract::extract_fields(&**session).await)
        };
        match tokio::time::timeout(self.settings.nav_timeout, attempt).await {
            Ok(Ok(fields)) => {
                tracing::debug!(target: "fx", symbol, ?fields, "extraction pass finished");
                fields
            }
            Ok(Err(e)) => {
                tracing::warn!(target: "fx", symbol, error = ?e, "extraction failed, synthesizing");
                ExtractedFields::default()
            }
            Err(_) => {
                tracing::warn!(target: "fx", symbol, "extraction timed out, synthesizing");
                ExtractedFields::default()
            }
        }
    }
}
