//! Framecut Engine - timeline compositing and frame caching
//!
//! Given a playhead time and a timeline snapshot, produces a single
//! rendered video frame, caching composited results so playback and
//! scrubbing avoid redundant decode/composite work.

pub mod cache;
pub mod clock;
pub mod compositor;
pub mod raster;
pub mod session;

pub use cache::FrameCache;
pub use clock::PlaybackClock;
pub use compositor::{EngineConfig, Renderer};
pub use session::EditorSession;
