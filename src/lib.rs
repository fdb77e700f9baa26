// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod cache;
pub mod config;
pub mod fx;
pub mod metrics;
pub mod news;
pub mod scheduler;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::cache::TtlCache;
pub use crate::config::{AppConfig, SourceFailurePolicy};
pub use crate::fx::{FxIngestor, FxSettings};
pub use crate::news::NewsIngestor;
