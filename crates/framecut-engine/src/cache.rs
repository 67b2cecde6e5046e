//! Composited-frame cache.
//!
//! Maps a quantized frame index plus a timeline fingerprint to a fully
//! composited raster frame. Invalidation is lazy: a generation counter
//! is bumped instead of scanning entries; stale entries are dropped when
//! encountered or when the byte budget forces eviction.

use framecut_core::SharedFrameBuffer;
use framecut_timeline::Fingerprint;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

struct Entry {
    fingerprint: Fingerprint,
    generation: u64,
    last_access: u64,
    frame: SharedFrameBuffer,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<i64, Entry>,
    generation: u64,
    access_seq: u64,
    total_bytes: usize,
}

/// Bounded LRU cache of composited frames.
///
/// Entries are `Arc`-swapped whole, never mutated in place, so readers
/// can't observe torn frames; per key the last write wins.
pub struct FrameCache {
    inner: Mutex<CacheInner>,
    capacity_bytes: usize,
}

impl FrameCache {
    /// Create a cache bounded to the given byte budget.
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity_bytes,
        }
    }

    /// Look up a frame. Misses on absent keys, stale generations, and
    /// fingerprint mismatches (both of which drop the entry).
    pub fn get(&self, frame_index: i64, fingerprint: Fingerprint) -> Option<SharedFrameBuffer> {
        let mut inner = self.inner.lock();
        let generation = inner.generation;
        inner.access_seq += 1;
        let seq = inner.access_seq;

        let stale = match inner.entries.get_mut(&frame_index) {
            None => return None,
            Some(entry) => {
                if entry.generation == generation && entry.fingerprint == fingerprint {
                    entry.last_access = seq;
                    return Some(entry.frame.clone());
                }
                true
            }
        };
        if stale {
            if let Some(entry) = inner.entries.remove(&frame_index) {
                inner.total_bytes -= entry.frame.memory_size();
            }
        }
        None
    }

    /// Store a frame under the given key, evicting least-recently-used
    /// entries while over the byte budget.
    pub fn put(&self, frame_index: i64, fingerprint: Fingerprint, frame: SharedFrameBuffer) {
        let mut inner = self.inner.lock();
        inner.access_seq += 1;
        let seq = inner.access_seq;
        let generation = inner.generation;

        let bytes = frame.memory_size();
        if let Some(old) = inner.entries.insert(
            frame_index,
            Entry {
                fingerprint,
                generation,
                last_access: seq,
                frame,
            },
        ) {
            inner.total_bytes -= old.frame.memory_size();
        }
        inner.total_bytes += bytes;

        while inner.total_bytes > self.capacity_bytes && inner.entries.len() > 1 {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(k, _)| *k);
            match oldest {
                Some(key) if key != frame_index => {
                    if let Some(entry) = inner.entries.remove(&key) {
                        inner.total_bytes -= entry.frame.memory_size();
                        debug!(frame_index = key, "evicted cached frame");
                    }
                }
                _ => break,
            }
        }
    }

    /// Invalidate every entry by bumping the generation counter.
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        debug!(generation = inner.generation, "frame cache invalidated");
    }

    /// Number of stored entries (including not-yet-reclaimed stale ones).
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Bytes held by stored frames.
    pub fn memory_usage(&self) -> usize {
        self.inner.lock().total_bytes
    }
}
