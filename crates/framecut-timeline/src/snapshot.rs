//! Immutable timeline snapshots and content fingerprinting.
//!
//! The compositor never reads the editable [`Timeline`](crate::Timeline)
//! directly. Every render request executes against a `TimelineSnapshot`
//! value captured at a point in time, so the cache fingerprint stays
//! sound while the UI keeps editing.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::settings::ProjectSettings;
use crate::track::Track;

/// A value summarizing all state that affects composited pixels.
///
/// Two different timelines (or the same timeline under different project
/// settings) must never collide on the same cache key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Combine a snapshot with the project settings that shape its pixels.
    pub fn of(snapshot: &TimelineSnapshot, settings: &ProjectSettings) -> Self {
        let mut hasher = DefaultHasher::new();
        settings.hash_content(&mut hasher);
        snapshot.content_hash().hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Fold a requested output size into the fingerprint, so renders of
    /// the same timeline at different sizes never share a cache slot.
    pub fn with_dimensions(self, width: u32, height: u32) -> Self {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        width.hash(&mut hasher);
        height.hash(&mut hasher);
        Self(hasher.finish())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// The ordered set of tracks at a point in time, treated as a value.
///
/// Cheap to clone (`Arc` inside); structurally different timelines have
/// different content hashes.
#[derive(Debug, Clone)]
pub struct TimelineSnapshot {
    tracks: Arc<[Track]>,
    content_hash: u64,
}

impl TimelineSnapshot {
    /// Capture a snapshot from the current track list.
    pub fn capture(tracks: &[Track]) -> Self {
        let mut hasher = DefaultHasher::new();
        tracks.len().hash(&mut hasher);
        for track in tracks {
            track.hash_content(&mut hasher);
        }
        Self {
            tracks: tracks.to_vec().into(),
            content_hash: hasher.finish(),
        }
    }

    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::capture(&[])
    }

    /// Tracks in z-order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Hash over every field that affects compositing output.
    pub fn content_hash(&self) -> u64 {
        self.content_hash
    }

    /// Derived total duration: latest end of any element, zero when empty.
    pub fn total_duration(&self) -> f64 {
        self.tracks.iter().map(|t| t.end_time()).fold(0.0, f64::max)
    }
}
