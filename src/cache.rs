//! # TTL Cache
//! Single-slot snapshot cache with a fixed time-to-live.
//!
//! Each ingestion loop owns exactly one instance (injected at
//! construction, never a module-level singleton). A read always sees
//! either the previous complete payload or the newly written complete
//! payload, never a mix.

use std::{
    sync::Mutex,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

#[derive(Debug)]
pub struct TtlCache<T> {
    inner: Mutex<Option<Entry<T>>>,
    ttl: Duration,
}

#[derive(Debug)]
struct Entry<T> {
    payload: T,
    captured_at_ms: u64,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(None),
            ttl,
        }
    }

    /// Replace the payload and reset the capture timestamp to now.
    pub fn write(&self, payload: T) {
        self.write_at(payload, now_unix_ms());
    }

    pub fn write_at(&self, payload: T, now_ms: u64) {
        let mut inner = self.inner.lock().expect("ttl cache mutex poisoned");
        *inner = Some(Entry {
            payload,
            captured_at_ms: now_ms,
        });
    }

    /// Returns the last payload (if any) plus its freshness flag.
    /// Stale payloads are kept, not evicted: the owning loop decides
    /// whether stale-but-valid beats an empty result.
    pub fn read(&self) -> Option<(T, bool)> {
        self.read_at(now_unix_ms())
    }

    pub fn read_at(&self, now_ms: u64) -> Option<(T, bool)> {
        let inner = self.inner.lock().expect("ttl cache mutex poisoned");
        inner.as_ref().map(|e| {
            let age = now_ms.saturating_sub(e.captured_at_ms);
            (e.payload.clone(), age < self.ttl.as_millis() as u64)
        })
    }

    /// Fresh payload or nothing; the common fast path for both loops.
    pub fn read_fresh(&self) -> Option<T> {
        self.read()
            .and_then(|(payload, fresh)| fresh.then_some(payload))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Current UNIX time in milliseconds.
fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_millis() as u64
}
