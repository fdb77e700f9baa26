// src/news/classify.rs
//
// Rule-based market-impact / currency classifier. Pure functions over
// the lowercase concatenation of title and summary; all keyword tables
// are fixed and ordered, and every output preserves table order, not
// discovery order in the text.

use sha2::{Digest, Sha256};

use crate::news::types::ImpactLevel;

/// Impact tiers, tested HIGH first. The first tier with any match
/// wins regardless of keyword position in the text.
static HIGH_IMPACT: &[&str] = &[
    "federal reserve",
    "fed",
    "ecb",
    "bank of england",
    "bank of japan",
    "interest rate",
    "rate hike",
    "rate cut",
    "monetary policy",
    "nonfarm payroll",
    "nfp",
    "unemployment",
    "cpi",
    "inflation",
    "fomc",
    "jackson hole",
    "central bank",
    "quantitative easing",
    "recession",
    "gdp",
    "economic growth",
    "trade war",
];

static MEDIUM_IMPACT: &[&str] = &[
    "retail sales",
    "consumer confidence",
    "pmi",
    "manufacturing",
    "housing starts",
    "jobless claims",
    "ism",
    "consumer price",
    "producer price",
    "trade balance",
    "current account",
    "business confidence",
    "industrial production",
];

static LOW_IMPACT: &[&str] = &[
    "earnings",
    "stock",
    "market outlook",
    "analyst",
    "commodity",
    "oil price",
    "gold price",
];

/// Per-currency keyword lists: currency name, issuing central bank,
/// country/region. Table order fixes the output order. The trailing
/// spaces in "us " / "uk " are deliberate word boundaries.
static CURRENCY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "USD",
        &[
            "dollar",
            "fed",
            "federal reserve",
            "united states",
            "us ",
            "america",
            "treasury",
        ],
    ),
    (
        "EUR",
        &[
            "euro",
            "ecb",
            "european central bank",
            "eurozone",
            "europe",
            "germany",
            "france",
        ],
    ),
    (
        "GBP",
        &[
            "pound",
            "sterling",
            "bank of england",
            "boe",
            "britain",
            "uk ",
            "united kingdom",
        ],
    ),
    ("JPY", &["yen", "bank of japan", "boj", "japan", "nikkei"]),
    ("CHF", &["franc", "swiss", "switzerland", "snb"]),
    (
        "AUD",
        &["aussie", "australia", "rba", "reserve bank of australia"],
    ),
    ("CAD", &["loonie", "canada", "bank of canada", "boc"]),
    ("NZD", &["kiwi", "new zealand", "rbnz"]),
];

/// Major base/quote pairs; a pair is affected when either side was
/// detected. Output keeps this order.
static MAJOR_PAIRS: &[(&str, &str)] = &[
    ("EUR", "USD"),
    ("GBP", "USD"),
    ("USD", "JPY"),
    ("USD", "CHF"),
    ("AUD", "USD"),
    ("USD", "CAD"),
    ("NZD", "USD"),
    ("EUR", "JPY"),
    ("GBP", "JPY"),
    ("EUR", "GBP"),
];

static TOPIC_TAGS: &[&str] = &[
    "monetary policy",
    "interest rates",
    "inflation",
    "employment",
    "gdp",
    "trade",
    "central bank",
    "economic data",
    "market outlook",
];

const MAX_TAGS: usize = 5;
const TITLE_ID_MAX: usize = 30;
const LINK_ID_HEX: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub impact_level: ImpactLevel,
    pub currencies: Vec<String>,
    pub pairs: Vec<String>,
    pub tags: Vec<String>,
}

/// Classify one article from its title and body/summary.
pub fn classify(title: &str, body: &str) -> Classification {
    let text = format!("{} {}", title, body).to_lowercase();
    let currencies = extract_currencies(&text);
    let pairs = derive_pairs(&currencies);
    Classification {
        impact_level: classify_impact(&text),
        currencies,
        pairs,
        tags: extract_tags(&text),
    }
}

pub fn classify_impact(text: &str) -> ImpactLevel {
    let tiers = [
        (ImpactLevel::High, HIGH_IMPACT),
        (ImpactLevel::Medium, MEDIUM_IMPACT),
        (ImpactLevel::Low, LOW_IMPACT),
    ];
    for (level, keywords) in tiers {
        if keywords.iter().any(|k| text.contains(k)) {
            return level;
        }
    }
    // Unclassified financial news is assumed non-trivial.
    ImpactLevel::Medium
}

pub fn extract_currencies(text: &str) -> Vec<String> {
    CURRENCY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(code, _)| code.to_string())
        .collect()
}

/// Fully derived from the detected currencies and the fixed pair
/// table; never set independently.
pub fn derive_pairs(currencies: &[String]) -> Vec<String> {
    MAJOR_PAIRS
        .iter()
        .filter(|(base, quote)| {
            currencies.iter().any(|c| c == base) || currencies.iter().any(|c| c == quote)
        })
        .map(|(base, quote)| format!("{base}{quote}"))
        .collect()
}

pub fn extract_tags(text: &str) -> Vec<String> {
    TOPIC_TAGS
        .iter()
        .filter(|tag| text.contains(*tag))
        .take(MAX_TAGS)
        .map(|tag| tag.to_string())
        .collect()
}

/// Stable display id. The article link is near-unique, so prefer a
/// truncated digest of it; fall back to a title slug when the feed
/// omits the link. Slug collisions between similarly titled articles
/// are an accepted, bounded risk.
pub fn derive_id(title: &str, link: Option<&str>) -> String {
    if let Some(link) = link {
        let digest = Sha256::digest(link.as_bytes());
        let mut hex = String::with_capacity(LINK_ID_HEX);
        for byte in digest.iter().take(LINK_ID_HEX / 2) {
            hex.push_str(&format!("{byte:02x}"));
        }
        return hex;
    }
    title_slug(title)
}

fn title_slug(title: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = true; // suppress a leading separator
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
        if slug.len() >= TITLE_ID_MAX {
            break;
        }
    }
    slug.trim_end_matches('-').to_string()
}
