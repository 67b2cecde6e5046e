//! Persistence seam for timelines.
//!
//! The engine does not care how timelines are transported (local call,
//! RPC, file read); it only needs JSON-shaped records back. Uses JSON
//! with a schema version field for forward-compatible persistence.

use framecut_core::{FramecutError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::track::{Timeline, Track};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned timeline file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineFile {
    /// Schema version for migration.
    pub version: u32,
    /// Tracks in z-order.
    pub tracks: Vec<Track>,
}

impl TimelineFile {
    /// Wrap the current track list.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            version: CURRENT_VERSION,
            tracks,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| FramecutError::Serialization(format!("failed to serialize timeline: {e}")))
    }

    /// Deserialize from JSON bytes, rejecting newer schema versions.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| FramecutError::Serialization(format!("invalid JSON: {e}")))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > CURRENT_VERSION {
            return Err(FramecutError::Serialization(format!(
                "timeline file version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        serde_json::from_value(raw)
            .map_err(|e| FramecutError::Serialization(format!("failed to parse timeline: {e}")))
    }
}

/// Narrow interface to the external persistence layer.
pub trait EditorStore: Send + Sync {
    /// Retrieve the stored timeline for a project scene, if any.
    fn load_timeline(&self, project_id: Uuid, scene_id: Option<Uuid>) -> Result<Option<Timeline>>;

    /// Persist the timeline for a project scene.
    fn save_timeline(
        &self,
        project_id: Uuid,
        scene_id: Option<Uuid>,
        timeline: &Timeline,
    ) -> Result<()>;
}

/// In-memory store used by tests and as a reference implementation.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<(Uuid, Option<Uuid>), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EditorStore for MemoryStore {
    fn load_timeline(&self, project_id: Uuid, scene_id: Option<Uuid>) -> Result<Option<Timeline>> {
        let records = self.records.lock();
        let Some(bytes) = records.get(&(project_id, scene_id)) else {
            return Ok(None);
        };
        let file = TimelineFile::from_json(bytes)?;
        let mut timeline = Timeline {
            tracks: file.tracks,
        };
        timeline.ensure_main_track();
        Ok(Some(timeline))
    }

    fn save_timeline(
        &self,
        project_id: Uuid,
        scene_id: Option<Uuid>,
        timeline: &Timeline,
    ) -> Result<()> {
        let bytes = TimelineFile::new(timeline.tracks.clone()).to_json()?;
        self.records.lock().insert((project_id, scene_id), bytes);
        Ok(())
    }
}
