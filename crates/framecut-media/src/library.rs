//! Media metadata library and source resolution.
//!
//! Resolution is a pure lookup against registered metadata; no decoding
//! happens until a frame is requested. The library owns decoder sessions
//! (one per video item, created lazily) and a cache of decoded stills.

use framecut_core::{FrameBuffer, FramecutError, Result, SharedFrameBuffer};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::decode::DecodeBackend;
use crate::session::DecoderSession;

/// Kind of media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

/// Metadata for one media item.
///
/// Immutable once referenced by an element, except for metadata backfill
/// (dimensions/duration filled in after probing completes elsewhere).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Unique media ID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Media kind
    pub kind: MediaKind,
    /// Natural width in pixels
    pub width: u32,
    /// Natural height in pixels
    pub height: u32,
    /// Natural duration in seconds (zero for stills)
    pub duration: f64,
    /// Source locator
    pub path: PathBuf,
}

impl MediaItem {
    /// Register-ready item with a fresh ID.
    pub fn new(name: impl Into<String>, kind: MediaKind, path: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            width: 0,
            height: 0,
            duration: 0.0,
            path: path.into(),
        }
    }

    /// Builder-style natural dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Builder-style natural duration.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }
}

/// A resolved, decodable source.
///
/// Exposes the item's natural metadata; for video the per-item decoder
/// session rides along.
#[derive(Clone)]
pub struct SourceHandle {
    /// Item metadata at resolution time.
    pub item: MediaItem,
    session: Option<Arc<DecoderSession>>,
}

impl SourceHandle {
    /// Media kind.
    pub fn kind(&self) -> MediaKind {
        self.item.kind
    }

    /// Natural dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.item.width, self.item.height)
    }

    /// Natural duration in seconds.
    pub fn duration(&self) -> f64 {
        self.item.duration
    }

    pub(crate) fn session(&self) -> Option<&Arc<DecoderSession>> {
        self.session.as_ref()
    }
}

/// Project media metadata plus decode resources.
pub struct MediaLibrary {
    backend: Arc<dyn DecodeBackend>,
    items: RwLock<HashMap<Uuid, MediaItem>>,
    sessions: Mutex<HashMap<Uuid, Arc<DecoderSession>>>,
    stills: Mutex<HashMap<Uuid, SharedFrameBuffer>>,
}

impl MediaLibrary {
    /// Create a library decoding through the given backend.
    pub fn new(backend: Arc<dyn DecodeBackend>) -> Self {
        Self {
            backend,
            items: RwLock::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            stills: Mutex::new(HashMap::new()),
        }
    }

    /// Register a media item. Returns its ID.
    pub fn register(&self, item: MediaItem) -> Uuid {
        let id = item.id;
        debug!(media = %id, kind = ?item.kind, "registered media item");
        self.items.write().insert(id, item);
        id
    }

    /// Look up media metadata.
    pub fn get(&self, media_id: Uuid) -> Option<MediaItem> {
        self.items.read().get(&media_id).cloned()
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Backfill natural dimensions after external probing.
    pub fn backfill_dimensions(&self, media_id: Uuid, width: u32, height: u32) -> Result<()> {
        let mut items = self.items.write();
        let item = items
            .get_mut(&media_id)
            .ok_or_else(|| FramecutError::MediaNotFound(media_id.to_string()))?;
        item.width = width;
        item.height = height;
        Ok(())
    }

    /// Backfill natural duration after external probing.
    ///
    /// A live decoder session picks up the new clamp bound as well, so
    /// sources resolved before probing completed stop clamping to zero.
    pub fn backfill_duration(&self, media_id: Uuid, duration: f64) -> Result<()> {
        {
            let mut items = self.items.write();
            let item = items
                .get_mut(&media_id)
                .ok_or_else(|| FramecutError::MediaNotFound(media_id.to_string()))?;
            item.duration = duration;
        }
        if let Some(session) = self.sessions.lock().get(&media_id) {
            session.set_duration(duration);
        }
        Ok(())
    }

    /// Drop a media item and its decode resources.
    pub fn unload(&self, media_id: Uuid) {
        self.items.write().remove(&media_id);
        if self.sessions.lock().remove(&media_id).is_some() {
            info!(media = %media_id, "dropped decoder session");
        }
        self.stills.lock().remove(&media_id);
    }

    /// Resolve a media ID to a decodable source handle.
    ///
    /// Pure metadata lookup; performs no decoding. `MediaNotFound` means
    /// the caller should skip the layer, not abort the frame.
    pub fn resolve(&self, media_id: Uuid) -> Result<SourceHandle> {
        let item = self
            .get(media_id)
            .ok_or_else(|| FramecutError::MediaNotFound(media_id.to_string()))?;
        let session = match item.kind {
            MediaKind::Video | MediaKind::Audio => Some(self.session_for(&item)),
            MediaKind::Image => None,
        };
        Ok(SourceHandle { item, session })
    }

    /// The decoded frame for a source at a media-local time.
    ///
    /// Images ignore the time and return the cached still; video suspends
    /// until the session's seek completes.
    pub async fn frame_at(&self, handle: &SourceHandle, local_time: f64) -> Result<SharedFrameBuffer> {
        match handle.kind() {
            MediaKind::Image => self.still_frame(&handle.item),
            MediaKind::Video => {
                let session = handle.session().ok_or_else(|| {
                    FramecutError::Internal("video handle without session".into())
                })?;
                session.frame_at(local_time).await
            }
            MediaKind::Audio => Err(FramecutError::Internal(
                "audio sources have no raster frames".into(),
            )),
        }
    }

    fn session_for(&self, item: &MediaItem) -> Arc<DecoderSession> {
        let mut sessions = self.sessions.lock();
        sessions
            .entry(item.id)
            .or_insert_with(|| {
                debug!(media = %item.id, "creating decoder session");
                Arc::new(DecoderSession::spawn(
                    item.id,
                    item.path.clone(),
                    item.duration,
                    self.backend.clone(),
                ))
            })
            .clone()
    }

    /// Decode-once cache for stills.
    fn still_frame(&self, item: &MediaItem) -> Result<SharedFrameBuffer> {
        if let Some(frame) = self.stills.lock().get(&item.id) {
            return Ok(frame.clone());
        }
        let decoded = image::open(&item.path)
            .map_err(|e| FramecutError::Decode(format!("failed to load image: {e}")))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        let frame = FrameBuffer::from_rgba8(width, height, decoded.as_raw())
            .ok_or_else(|| FramecutError::Decode("short image data".into()))?;
        let shared: SharedFrameBuffer = Arc::new(frame);
        self.stills.lock().insert(item.id, shared.clone());
        Ok(shared)
    }

    /// Inject a pre-decoded still (tests, thumbnails fed by the UI).
    pub fn insert_still(&self, media_id: Uuid, frame: SharedFrameBuffer) {
        self.stills.lock().insert(media_id, frame);
    }
}
