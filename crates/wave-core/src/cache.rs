//! Derived-result cache keyed by waveform identity and revision.
//!
//! Filters often precompute something from an input (a resampled copy, an
//! edge list, statistics). As long as the input's `(id, revision)` is
//! unchanged the cached result is still correct, so the cache stores one
//! entry per waveform id and invalidates it when the revision moves.
//!
//! The cache is shared across filter worker threads; the map is guarded by a
//! `parking_lot::Mutex` that is never held while computing.

use crate::metadata::{CacheKey, WaveformId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Map from waveform id to the value derived at one revision.
#[derive(Debug, Default)]
pub struct RevisionCache<V> {
    entries: Mutex<HashMap<WaveformId, (u64, V)>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> RevisionCache<V> {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached value for `key`, if one exists at exactly that revision.
    #[must_use]
    pub fn get(&self, key: CacheKey) -> Option<V> {
        let entries = self.entries.lock();
        match entries.get(&key.id) {
            Some((revision, value)) if *revision == key.revision => Some(value.clone()),
            _ => None,
        }
    }

    /// Store `value` for `key`, replacing any entry for the same id.
    pub fn insert(&self, key: CacheKey, value: V) {
        self.entries.lock().insert(key.id, (key.revision, value));
    }

    /// Return the cached value for `key` or compute and store it.
    ///
    /// `compute` runs without the lock held. If two threads miss on the same
    /// key concurrently both compute and the later insert wins.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(waveform = %key.id, revision = key.revision, "revision cache miss");
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Drop the entry for `id`.
    pub fn invalidate(&self, id: WaveformId) {
        self.entries.lock().remove(&id);
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of waveforms with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that had to compute.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
