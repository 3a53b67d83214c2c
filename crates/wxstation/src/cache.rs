//! Single-slot cache for the most recent successful observation.
//!
//! One entry is live at a time. Readers clone the entry out under a
//! read lock, so a scrape never blocks on network I/O and never sees
//! a half-written entry. The cache itself never expires anything;
//! staleness is a rendering-time decision.

use crate::observation::{CacheEntry, Observation};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

/// Thread-safe holder for the latest observation.
#[derive(Debug, Default)]
pub struct ObservationCache {
    slot: RwLock<Option<CacheEntry>>,
}

impl ObservationCache {
    /// Create an empty cache (process start state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry, if any successful fetch has happened yet.
    pub fn get(&self) -> Option<CacheEntry> {
        self.read_slot().clone()
    }

    /// Replace the entry with a fresh observation, stamping the local
    /// monotonic clock. Only called after a successful fetch; a failed
    /// fetch must leave the previous entry in place by never calling
    /// this.
    pub fn set(&self, observation: Observation) {
        let entry = CacheEntry {
            observation,
            fetched_at: Instant::now(),
        };
        *self.write_slot() = Some(entry);
    }

    // A poisoned lock only means a writer panicked mid-swap of an
    // `Option`, which cannot leave a torn entry. Recover the guard
    // rather than propagating the panic to every scrape.
    fn read_slot(&self) -> RwLockReadGuard<'_, Option<CacheEntry>> {
        match self.slot.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<CacheEntry>> {
        match self.slot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
