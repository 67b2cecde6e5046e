//! Editor session: one open timeline with its cache, renderer and clock.
//!
//! The session owns the frame cache explicitly (created when a timeline
//! opens, dropped when it closes) and arbitrates racing render requests:
//! the newest request's result is the one visibly committed.

use framecut_core::{Result, SharedFrameBuffer};
use framecut_media::MediaLibrary;
use framecut_timeline::{Fingerprint, ProjectSettings, TimelineSnapshot};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::clock::PlaybackClock;
use crate::compositor::{EngineConfig, Renderer};

/// One open timeline with everything needed to render it.
pub struct EditorSession {
    renderer: Renderer,
    settings: ProjectSettings,
    snapshot: Mutex<TimelineSnapshot>,
    clock: Mutex<PlaybackClock>,
    /// Monotonic render-request counter for supersession.
    request_seq: AtomicU64,
    /// Newest committed frame, tagged with its request number.
    latest: Mutex<Option<(u64, SharedFrameBuffer)>>,
}

impl EditorSession {
    /// Open a session over the given media library and settings.
    pub fn new(library: Arc<MediaLibrary>, settings: ProjectSettings, config: EngineConfig) -> Self {
        Self {
            renderer: Renderer::new(library, config),
            settings,
            snapshot: Mutex::new(TimelineSnapshot::empty()),
            clock: Mutex::new(PlaybackClock::new()),
            request_seq: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Replace the timeline snapshot, invalidating the cache if the
    /// fingerprint changed.
    pub fn set_snapshot(&self, snapshot: TimelineSnapshot) {
        let mut current = self.snapshot.lock();
        let before = Fingerprint::of(&current, &self.settings);
        let after = Fingerprint::of(&snapshot, &self.settings);
        *current = snapshot;
        if before != after {
            debug!(%after, "timeline changed, invalidating frame cache");
            self.renderer.cache().invalidate_all();
        }
    }

    /// The current snapshot value.
    pub fn snapshot(&self) -> TimelineSnapshot {
        self.snapshot.lock().clone()
    }

    /// Project settings for this session.
    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// The renderer (exposes the cache for inspection).
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Render the frame at `time` on the canvas size from settings.
    ///
    /// Returns `Ok(None)` when a newer request started while this one
    /// was rendering; the stale result is discarded instead of
    /// overwriting a newer committed frame.
    pub async fn render_at(&self, time: f64) -> Result<Option<SharedFrameBuffer>> {
        let seq = self.request_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = self.snapshot();
        let frame = self
            .renderer
            .composite(
                &snapshot,
                &self.settings,
                time,
                self.settings.canvas_width,
                self.settings.canvas_height,
            )
            .await?;

        if self.request_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, time, "discarding superseded render result");
            return Ok(None);
        }
        let mut latest = self.latest.lock();
        match *latest {
            Some((committed, _)) if committed > seq => Ok(None),
            _ => {
                *latest = Some((seq, frame.clone()));
                Ok(Some(frame))
            }
        }
    }

    /// The newest committed frame, for the UI to blit.
    pub fn latest_frame(&self) -> Option<SharedFrameBuffer> {
        self.latest.lock().as_ref().map(|(_, frame)| frame.clone())
    }

    /// Advance the clock and render the new time.
    pub async fn tick(&self, now: Instant) -> Result<Option<SharedFrameBuffer>> {
        let time = {
            let total = self.snapshot.lock().total_duration();
            self.clock.lock().tick(now, total)
        };
        self.render_at(time).await
    }

    /// Start playback.
    pub fn play(&self) {
        self.clock.lock().play();
    }

    /// Pause playback.
    pub fn pause(&self) {
        self.clock.lock().pause();
    }

    /// Toggle playback.
    pub fn toggle(&self) {
        self.clock.lock().toggle();
    }

    /// Seek to a time, clamped to the timeline duration.
    pub fn seek(&self, time: f64) {
        let total = self.snapshot.lock().total_duration();
        self.clock.lock().seek(time, total);
    }

    /// Set the playback speed factor.
    pub fn set_speed(&self, factor: f64) {
        self.clock.lock().set_speed(factor);
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.clock.lock().is_playing()
    }

    /// The authoritative current playhead time.
    pub fn current_time(&self) -> f64 {
        self.clock.lock().current_time()
    }
}
