// src/fx/types.rs
use chrono::{DateTime, Utc};

/// Fixed half-spread applied around the working price.
pub const HALF_SPREAD: f64 = 0.00005;

/// Number of sparkline points synthesized per quote.
pub const HISTORY_LEN: usize = 24;

/// One FX instrument snapshot. Superseded, never mutated, on the next
/// successful poll; lives only in process memory.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String, // 6-letter uppercase code, e.g. "EURUSD"
    pub bid: f64,
    pub ask: f64,
    pub change_percent: f64,
    pub timestamp: DateTime<Utc>,
    pub history: Vec<f64>, // HISTORY_LEN points of jitter around change_percent
    /// Provenance flag: false only when BOTH price and change came
    /// from a successful extraction pass.
    pub is_synthetic: bool,
}

/// A completed batch plus the symbol list that produced it. The cache
/// keys on the whole list (order included); a different request forces
/// a fresh fetch rather than partial reuse.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteBatch {
    pub symbols: Vec<String>,
    pub quotes: Vec<Quote>,
}
