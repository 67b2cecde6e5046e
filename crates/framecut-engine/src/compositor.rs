//! Timeline compositor.
//!
//! Turns (snapshot, time) into a single raster frame: cache lookup,
//! background fill, active-layer collection in z-order, per-layer decode
//! and contain-fit blit, then cache store. Per-layer failures skip the
//! layer; the worst case is a frame showing only the background.

use framecut_core::budget::{CACHE_FPS, FAILURE_BACKOFF, FRAME_CACHE_BYTES};
use framecut_core::{FrameBuffer, FramecutError, PixelFormat, Result, SharedFrameBuffer};
use framecut_media::MediaLibrary;
use framecut_timeline::{Background, Element, Fingerprint, ProjectSettings, TimelineSnapshot};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::FrameCache;
use crate::raster;

/// Tunables for the render pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed cache sampling rate, decoupled from project fps.
    pub cache_fps: f64,
    /// Byte budget for the composited-frame cache.
    pub cache_bytes: usize,
    /// How long a failing source is skipped before retrying.
    pub failure_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_fps: CACHE_FPS,
            cache_bytes: FRAME_CACHE_BYTES,
            failure_backoff: FAILURE_BACKOFF,
        }
    }
}

impl EngineConfig {
    /// Quantize a time to its cache slot.
    pub fn frame_index(&self, time: f64) -> i64 {
        (time * self.cache_fps).floor() as i64
    }
}

/// The outcome of one composite call.
struct LayerFetch {
    frames: Vec<SharedFrameBuffer>,
    /// True when a layer was dropped because its decode was superseded;
    /// such frames are returned but never cached.
    superseded: bool,
    /// True when a layer failed to decode this frame.
    failed: bool,
}

/// Composites timeline snapshots into raster frames.
pub struct Renderer {
    cache: Arc<FrameCache>,
    library: Arc<MediaLibrary>,
    config: EngineConfig,
    /// Negative cache: sources that recently failed and when to retry.
    failures: Mutex<HashMap<Uuid, Instant>>,
}

impl Renderer {
    /// Create a renderer over the given media library.
    pub fn new(library: Arc<MediaLibrary>, config: EngineConfig) -> Self {
        Self {
            cache: Arc::new(FrameCache::new(config.cache_bytes)),
            library,
            config,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Shared handle to the frame cache.
    pub fn cache(&self) -> &Arc<FrameCache> {
        &self.cache
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render the frame at `time` for the given snapshot and settings.
    ///
    /// Layers are decoded and composited in track order so z-ordering is
    /// deterministic regardless of decode latencies. The only fatal
    /// error is invalid output dimensions; it is never cached.
    pub async fn composite(
        &self,
        snapshot: &TimelineSnapshot,
        settings: &ProjectSettings,
        time: f64,
        out_width: u32,
        out_height: u32,
    ) -> Result<SharedFrameBuffer> {
        if out_width == 0 || out_height == 0 {
            return Err(FramecutError::InvalidOutputDimensions {
                width: out_width,
                height: out_height,
            });
        }

        // The requested output size is part of the key: the same
        // timeline rendered at two sizes yields two distinct frames.
        let fingerprint = Fingerprint::of(snapshot, settings).with_dimensions(out_width, out_height);
        let frame_index = self.config.frame_index(time);
        if let Some(hit) = self.cache.get(frame_index, fingerprint) {
            return Ok(hit);
        }

        let fetch = self.fetch_layers(snapshot, time).await;

        let mut output = FrameBuffer::new(out_width, out_height, PixelFormat::Rgba8);
        match settings.background {
            Background::Color { rgba } => output.fill(rgba),
            Background::Blur { intensity } => match fetch.frames.first() {
                Some(bottom) => raster::blur_background(&mut output, bottom, intensity),
                None => output.fill([0, 0, 0, 255]),
            },
        }

        for frame in &fetch.frames {
            raster::blit_contain(&mut output, frame);
        }

        let shared: SharedFrameBuffer = Arc::new(output);
        // Frames missing a layer to a transient failure are served but
        // not cached, so recovery is visible on the next request.
        if !fetch.superseded && !fetch.failed {
            self.cache.put(frame_index, fingerprint, shared.clone());
        }
        Ok(shared)
    }

    /// Collect and decode the active layers at `time`, in track order.
    async fn fetch_layers(&self, snapshot: &TimelineSnapshot, time: f64) -> LayerFetch {
        let mut fetch = LayerFetch {
            frames: Vec::new(),
            superseded: false,
            failed: false,
        };

        for track in snapshot.tracks() {
            if track.muted || !track.kind.composites_visually() {
                continue;
            }
            for element in track.elements_at(time) {
                if element.muted {
                    continue;
                }
                let Some(media_id) = element.media_id else {
                    continue;
                };
                match self.layer_frame(media_id, element, time).await {
                    Ok(frame) => fetch.frames.push(frame),
                    Err(FramecutError::DecodeSuperseded) => fetch.superseded = true,
                    Err(FramecutError::MediaNotFound(_)) => {
                        debug!(element = %element.id, "skipping layer with missing media");
                    }
                    Err(e) if e.is_layer_recoverable() => fetch.failed = true,
                    // Internal errors also just drop the layer; the
                    // frame must still render.
                    Err(e) => {
                        warn!(element = %element.id, error = %e, "unexpected layer failure");
                        fetch.failed = true;
                    }
                }
            }
        }
        fetch
    }

    async fn layer_frame(
        &self,
        media_id: Uuid,
        element: &Element,
        time: f64,
    ) -> Result<SharedFrameBuffer> {
        if self.in_backoff(media_id) {
            return Err(FramecutError::Decode("source in failure backoff".into()));
        }

        let handle = self.library.resolve(media_id)?;
        let local_time = element.local_media_time(time);
        match self.library.frame_at(&handle, local_time).await {
            Ok(frame) => {
                self.failures.lock().remove(&media_id);
                Ok(frame)
            }
            Err(FramecutError::DecodeSuperseded) => Err(FramecutError::DecodeSuperseded),
            Err(e) => {
                let retry_at = Instant::now() + self.config.failure_backoff;
                if self.failures.lock().insert(media_id, retry_at).is_none() {
                    warn!(media = %media_id, error = %e, "layer decode failed, backing off");
                }
                Err(e)
            }
        }
    }

    fn in_backoff(&self, media_id: Uuid) -> bool {
        let mut failures = self.failures.lock();
        match failures.get(&media_id) {
            Some(until) if Instant::now() < *until => true,
            Some(_) => {
                failures.remove(&media_id);
                false
            }
            None => false,
        }
    }
}
