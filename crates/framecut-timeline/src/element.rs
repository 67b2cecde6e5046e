//! Element types for the timeline.

use framecut_core::{FramecutError, Result, TimeRange};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A single element on a track.
///
/// Times are timeline-relative seconds. The visible window is
/// `[start_time, start_time + duration - trim_start - trim_end)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Unique element ID
    pub id: Uuid,
    /// Element name (displayed in UI)
    pub name: String,
    /// Timeline start time in seconds
    pub start_time: f64,
    /// Nominal duration in seconds
    pub duration: f64,
    /// Seconds trimmed from the head
    pub trim_start: f64,
    /// Seconds trimmed from the tail
    pub trim_end: f64,
    /// Referenced media item, if any
    pub media_id: Option<Uuid>,
    /// Is element muted
    pub muted: bool,
}

impl Element {
    /// Create a new element, validating the trim invariant.
    pub fn new(name: impl Into<String>, start_time: f64, duration: f64) -> Result<Self> {
        let element = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_time,
            duration,
            trim_start: 0.0,
            trim_end: 0.0,
            media_id: None,
            muted: false,
        };
        element.validate()?;
        Ok(element)
    }

    /// Attach a media reference.
    pub fn with_media(mut self, media_id: Uuid) -> Self {
        self.media_id = Some(media_id);
        self
    }

    /// Check `duration > 0` and `trim_start + trim_end <= duration`.
    pub fn validate(&self) -> Result<()> {
        if !(self.duration > 0.0) {
            return Err(FramecutError::InvalidElement(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if self.trim_start < 0.0 || self.trim_end < 0.0 {
            return Err(FramecutError::InvalidElement(
                "trim values must be non-negative".into(),
            ));
        }
        if self.trim_start + self.trim_end > self.duration {
            return Err(FramecutError::InvalidElement(format!(
                "trims ({} + {}) exceed duration {}",
                self.trim_start, self.trim_end, self.duration
            )));
        }
        Ok(())
    }

    /// Duration actually visible on the timeline.
    #[inline]
    pub fn visible_duration(&self) -> f64 {
        (self.duration - self.trim_start - self.trim_end).max(0.0)
    }

    /// The half-open window during which this element is active.
    #[inline]
    pub fn window(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.visible_duration())
    }

    /// Whether the element is active at the given timeline time.
    #[inline]
    pub fn active_at(&self, time: f64) -> bool {
        self.window().contains(time)
    }

    /// Media-local time for a timeline time, accounting for the head trim.
    #[inline]
    pub fn local_media_time(&self, time: f64) -> f64 {
        time - self.start_time + self.trim_start
    }

    /// Adjust the trims, enforcing the invariant.
    pub fn set_trims(&mut self, trim_start: f64, trim_end: f64) -> Result<()> {
        let prev = (self.trim_start, self.trim_end);
        self.trim_start = trim_start;
        self.trim_end = trim_end;
        if let Err(e) = self.validate() {
            (self.trim_start, self.trim_end) = prev;
            return Err(e);
        }
        Ok(())
    }

    /// Feed the fields that affect composited pixels into a hasher.
    pub(crate) fn hash_content<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.start_time.to_bits().hash(state);
        self.duration.to_bits().hash(state);
        self.trim_start.to_bits().hash(state);
        self.trim_end.to_bits().hash(state);
        self.media_id.hash(state);
        self.muted.hash(state);
    }
}
