//! Shared fixtures for the integration tests.

use framecut_core::FrameBuffer;
use framecut_media::{DecodeBackend, MediaItem, MediaKind, MediaLibrary};
use framecut_timeline::{Element, ProjectSettings, Timeline};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Install a test subscriber once so `RUST_LOG` works in tests.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Backend decoding every video to one solid color.
pub struct SolidBackend {
    pub color: [u8; 4],
    pub width: u32,
    pub height: u32,
}

impl DecodeBackend for SolidBackend {
    fn decode_at(&self, _path: &Path, _time: f64) -> framecut_core::Result<FrameBuffer> {
        Ok(FrameBuffer::solid(self.width, self.height, self.color))
    }
}

/// Backend that always fails, simulating a corrupt source.
pub struct BrokenBackend;

impl DecodeBackend for BrokenBackend {
    fn decode_at(&self, _path: &Path, _time: f64) -> framecut_core::Result<FrameBuffer> {
        Err(framecut_core::FramecutError::Decode(
            "corrupt stream".into(),
        ))
    }
}

/// Failing backend that counts how often it is actually reached.
#[derive(Default)]
pub struct CountingBrokenBackend {
    pub attempts: std::sync::atomic::AtomicUsize,
}

impl DecodeBackend for CountingBrokenBackend {
    fn decode_at(&self, _path: &Path, _time: f64) -> framecut_core::Result<FrameBuffer> {
        self.attempts
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Err(framecut_core::FramecutError::Decode(
            "corrupt stream".into(),
        ))
    }
}

/// Solid-color backend with a per-decode delay, to hold seeks in flight.
pub struct SlowSolidBackend {
    pub color: [u8; 4],
    pub width: u32,
    pub height: u32,
    pub delay: std::time::Duration,
}

impl DecodeBackend for SlowSolidBackend {
    fn decode_at(&self, _path: &Path, _time: f64) -> framecut_core::Result<FrameBuffer> {
        std::thread::sleep(self.delay);
        Ok(FrameBuffer::solid(self.width, self.height, self.color))
    }
}

/// Small canvas settings so pixel assertions stay cheap.
pub fn small_settings() -> ProjectSettings {
    let mut settings = ProjectSettings::default();
    settings.canvas_width = 64;
    settings.canvas_height = 64;
    settings
}

/// A library with one registered video item, returning (library, media_id).
pub fn video_library(backend: Arc<dyn DecodeBackend>, duration: f64) -> (Arc<MediaLibrary>, Uuid) {
    let library = Arc::new(MediaLibrary::new(backend));
    let id = library.register(
        MediaItem::new("clip", MediaKind::Video, "clip.mp4")
            .with_dimensions(32, 32)
            .with_duration(duration),
    );
    (library, id)
}

/// A library with one injected still image, returning (library, media_id).
pub fn image_library(color: [u8; 4], w: u32, h: u32) -> (Arc<MediaLibrary>, Uuid) {
    let library = Arc::new(MediaLibrary::new(Arc::new(SolidBackend {
        color: [0, 0, 0, 255],
        width: 4,
        height: 4,
    })));
    let id = library.register(
        MediaItem::new("photo", MediaKind::Image, "photo.png").with_dimensions(w, h),
    );
    library.insert_still(id, Arc::new(FrameBuffer::solid(w, h, color)));
    (library, id)
}

/// A timeline whose main track holds one element over the given media.
pub fn single_element_timeline(media_id: Uuid, start: f64, duration: f64) -> Timeline {
    let mut timeline = Timeline::new();
    let track_id = timeline.tracks[0].id;
    let element = Element::new("layer", start, duration)
        .unwrap()
        .with_media(media_id);
    timeline.add_element(track_id, element);
    timeline
}
