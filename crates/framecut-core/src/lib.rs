//! Framecut Core - Foundation types for the compositing engine
//!
//! This crate provides the fundamental types used throughout Framecut:
//! - Frame rate and time range handling
//! - Frame buffers and pixel formats
//! - Geometric primitives and contain-fit placement
//! - The shared error taxonomy

pub mod error;
pub mod frame;
pub mod geometry;
pub mod time;

pub use error::{FramecutError, Result};
pub use frame::{FrameBuffer, FramePlane, PixelFormat, SharedFrameBuffer};
pub use geometry::{contain_fit, DrawRect, Rect, Vec2};
pub use time::{FrameRate, TimeRange};

/// Memory and scheduling budgets for the render pipeline.
pub mod budget {
    use std::time::Duration;

    /// Total composited-frame cache budget in RAM.
    pub const FRAME_CACHE_BYTES: usize = 512 * 1024 * 1024; // 512 MB

    /// Fixed sampling rate used to quantize cache keys, decoupled from
    /// the project's playback fps.
    pub const CACHE_FPS: f64 = 30.0;

    /// Seek tolerance: requests within this distance of the current
    /// decode position reuse the held frame instead of reseeking.
    pub const SEEK_EPSILON: f64 = 0.03;

    /// Upper bound on a single seek/decode before it fails with a
    /// decode error instead of stalling the tick loop.
    pub const DECODE_TIMEOUT: Duration = Duration::from_secs(2);

    /// How long a failing media source is skipped before the decoder
    /// is tried again.
    pub const FAILURE_BACKOFF: Duration = Duration::from_secs(1);
}
