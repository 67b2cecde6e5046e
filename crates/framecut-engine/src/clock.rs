//! Playback clock.
//!
//! Advances the requested render time at wall-clock rate times speed and
//! stops at timeline end. The clock holds no thread of its own; the
//! display-refresh tick drives it.

use std::time::Instant;

/// Valid playback speed range.
pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 2.0;

/// Transport state for one timeline.
#[derive(Debug)]
pub struct PlaybackClock {
    playing: bool,
    current: f64,
    speed: f64,
    last_tick: Option<Instant>,
}

impl PlaybackClock {
    /// A stopped clock at time zero.
    pub fn new() -> Self {
        Self {
            playing: false,
            current: 0.0,
            speed: 1.0,
            last_tick: None,
        }
    }

    /// Start playing. No-op while already playing.
    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.last_tick = None;
    }

    /// Pause, holding the current time.
    pub fn pause(&mut self) {
        self.playing = false;
        self.last_tick = None;
    }

    /// Toggle between playing and paused.
    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to a time, clamped to `[0, total]`. Legal in any state.
    pub fn seek(&mut self, time: f64, total: f64) {
        self.current = time.clamp(0.0, total.max(0.0));
    }

    /// Set the speed factor, clamped to the valid range.
    pub fn set_speed(&mut self, factor: f64) {
        self.speed = factor.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Advance by the wall-clock delta since the previous tick.
    ///
    /// Reaching or passing `total` stops playback and clamps the time to
    /// it (no auto-loop). Returns the new current time.
    pub fn tick(&mut self, now: Instant, total: f64) -> f64 {
        if !self.playing {
            return self.current;
        }
        let delta = self
            .last_tick
            .map(|prev| now.duration_since(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        let next = self.current + delta * self.speed;
        if next >= total && total > 0.0 {
            self.current = total;
            self.playing = false;
            self.last_tick = None;
        } else {
            self.current = next;
        }
        self.current
    }

    /// Whether the clock is currently playing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The authoritative current time.
    pub fn current_time(&self) -> f64 {
        self.current
    }

    /// The current speed factor.
    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}
