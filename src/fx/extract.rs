// src/fx/extract.rs
//
// Multi-strategy field extraction. Each selector is an independent
// strategy; lists are ordered most-specific first and the first
// successful numeric parse wins. No averaging, no cross-checking.

use crate::fx::browser::QuoteSession;

/// Price selectors, most reliable first. A tunable policy table, not
/// per-call-site configuration.
pub static PRICE_SELECTORS: &[&str] = &[
    ".js-symbol-last",
    "[data-field=\"last_price\"]",
    ".tv-symbol-price-quote__value",
    "[class*=\"last-price\"]",
    ".last-price",
];

pub static CHANGE_SELECTORS: &[&str] = &[
    ".js-symbol-change-pt",
    "[data-field=\"change_percent\"]",
    ".tv-symbol-price-quote__change-value",
    "[class*=\"change-percent\"]",
];

/// Extraction result. Both fields absent is not an error; it signals
/// "fall through to synthesis".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtractedFields {
    pub price: Option<f64>,
    pub change_percent: Option<f64>,
}

/// Strip everything that is not a digit, sign, or decimal point, then
/// parse. Element text like "1.0852 USD" or "-0.31%" reduces to a
/// plain number.
pub fn parse_scrubbed(text: &str) -> Option<f64> {
    let scrubbed: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        .collect();
    scrubbed.parse::<f64>().ok().filter(|v| v.is_finite())
}

async fn first_match(
    page: &dyn QuoteSession,
    selectors: &[&str],
    accept: fn(f64) -> bool,
) -> Option<f64> {
    for selector in selectors {
        if let Some(text) = page.text_of(selector).await {
            if let Some(value) = parse_scrubbed(&text).filter(|v| accept(*v)) {
                return Some(value);
            }
        }
    }
    None
}

/// Run both selector lists against the currently open page. Price must
/// parse to a finite number > 0; change accepts any finite value
/// (negative and zero are valid changes).
pub async fn extract_fields(page: &dyn QuoteSession) -> ExtractedFields {
    ExtractedFields {
        price: first_match(page, PRICE_SELECTORS, |v| v > 0.0).await,
        change_percent: first_match(page, CHANGE_SELECTORS, |_| true).await,
    }
}
