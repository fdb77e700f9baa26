// src/fx/synth.rs
//
// Synthetic quote generation for the degraded mode. The upstream site
// is unreliable and rate-limit-sensitive; each symbol degrades
// independently to a labeled synthetic value instead of failing the
// whole batch.

use chrono::Utc;
use rand::Rng;

use crate::fx::extract::ExtractedFields;
use crate::fx::types::{Quote, HALF_SPREAD, HISTORY_LEN};

/// Realistic reference prices for the majors; unknown symbols fall
/// back to 1.0.
static BASE_PRICES: &[(&str, f64)] = &[
    ("EURUSD", 1.0850),
    ("GBPUSD", 1.2650),
    ("USDJPY", 149.80),
    ("USDCHF", 0.9180),
    ("AUDUSD", 0.6720),
    ("USDCAD", 1.3580),
    ("NZDUSD", 0.6180),
    ("EURJPY", 162.50),
    ("GBPJPY", 189.40),
    ("EURGBP", 0.8580),
];

pub fn base_price(symbol: &str) -> f64 {
    BASE_PRICES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, p)| *p)
        .unwrap_or(1.0)
}

/// Build a complete `Quote` from whatever extraction produced.
/// Missing fields are synthesized: price = table base ± 2% jitter,
/// change drawn from ±1%. The 24-point history is always jitter
/// (±0.75) around the change. `is_synthetic` stays false only when
/// both price and change were extracted.
pub fn build_quote(symbol: &str, fields: ExtractedFields) -> Quote {
    let mut rng = rand::rng();

    let price = fields
        .price
        .unwrap_or_else(|| base_price(symbol) * (1.0 + rng.random_range(-0.02..0.02)));
    let change_percent = fields
        .change_percent
        .unwrap_or_else(|| rng.random_range(-1.0..1.0));

    let history = (0..HISTORY_LEN)
        .map(|_| change_percent + rng.random_range(-0.75..0.75))
        .collect();

    let bid = price - HALF_SPREAD;
    Quote {
        symbol: symbol.to_string(),
        bid,
        ask: bid + 2.0 * HALF_SPREAD,
        change_percent,
        timestamp: Utc::now(),
        history,
        is_synthetic: fields.price.is_none() || fields.change_percent.is_none(),
    }
}

/// Fully synthetic quote; used when no extraction was attempted (no
/// session) or nothing could be read.
pub fn synthesize(symbol: &str) -> Quote {
    build_quote(symbol, ExtractedFields::default())
}
