//! Framecut Timeline - Timeline data model
//!
//! Implements the timeline structure for the compositing engine:
//! - Tracks containing elements (media, audio, text)
//! - Immutable snapshots with a content fingerprint for cache invalidation
//! - Project settings (background, canvas, fps)
//! - Versioned JSON persistence seam

pub mod element;
pub mod settings;
pub mod snapshot;
pub mod store;
pub mod track;

pub use element::Element;
pub use settings::{Background, ProjectSettings};
pub use snapshot::{Fingerprint, TimelineSnapshot};
pub use store::{EditorStore, MemoryStore, TimelineFile};
pub use track::{Timeline, Track, TrackKind};
