//! Project-level settings that shape composited output.

use framecut_core::FrameRate;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Default canvas size.
pub const DEFAULT_CANVAS: (u32, u32) = (1920, 1080);

/// Background drawn under every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Background {
    /// Solid color fill (RGBA).
    Color { rgba: [u8; 4] },
    /// Blurred representation of the frame's own content.
    Blur { intensity: u32 },
}

impl Background {
    /// Opaque black.
    pub const BLACK: Self = Self::Color {
        rgba: [0, 0, 0, 255],
    };
}

impl Default for Background {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Settings controlling output size, fps and background for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Owning project identity; part of the cache fingerprint.
    pub project_id: Uuid,
    /// Background fill
    pub background: Background,
    /// Canvas width in pixels
    pub canvas_width: u32,
    /// Canvas height in pixels
    pub canvas_height: u32,
    /// Playback frame rate
    pub fps: FrameRate,
}

impl ProjectSettings {
    /// Settings for a new project with the given identity.
    pub fn new(project_id: Uuid) -> Self {
        Self {
            project_id,
            background: Background::default(),
            canvas_width: DEFAULT_CANVAS.0,
            canvas_height: DEFAULT_CANVAS.1,
            fps: FrameRate::FPS_30,
        }
    }

    pub(crate) fn hash_content<H: Hasher>(&self, state: &mut H) {
        self.project_id.hash(state);
        match self.background {
            Background::Color { rgba } => {
                0u8.hash(state);
                rgba.hash(state);
            }
            Background::Blur { intensity } => {
                1u8.hash(state);
                intensity.hash(state);
            }
        }
        self.canvas_width.hash(state);
        self.canvas_height.hash(state);
        self.fps.hash(state);
    }
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}
