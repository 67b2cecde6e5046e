//! Integration tests for the compositing pipeline.
//!
//! Exercises cross-crate interactions between framecut-timeline,
//! framecut-media and framecut-engine.

use framecut_core::FramecutError;
use framecut_engine::{EngineConfig, Renderer};
use framecut_media::{MediaItem, MediaKind};
use framecut_timeline::{Background, Element, Timeline};
use std::sync::Arc;
use uuid::Uuid;

use crate::support::*;

// ── Background and empty timelines ─────────────────────────────

#[tokio::test]
async fn empty_timeline_renders_background_only() {
    init_tracing();
    let (library, _id) = image_library([255, 255, 255, 255], 8, 8);
    let renderer = Renderer::new(library, EngineConfig::default());

    let mut settings = small_settings();
    settings.background = Background::Color {
        rgba: [12, 34, 56, 255],
    };

    let snapshot = Timeline::new().snapshot();
    let frame = renderer
        .composite(&snapshot, &settings, 7.5, 64, 64)
        .await
        .unwrap();

    assert_eq!(frame.pixel(0, 0), [12, 34, 56, 255]);
    assert_eq!(frame.pixel(63, 63), [12, 34, 56, 255]);
}

#[tokio::test]
async fn invalid_output_dimensions_are_fatal_and_uncached() {
    let (library, _id) = image_library([255, 255, 255, 255], 8, 8);
    let renderer = Renderer::new(library, EngineConfig::default());
    let snapshot = Timeline::new().snapshot();
    let settings = small_settings();

    match renderer.composite(&snapshot, &settings, 0.0, 0, 64).await {
        Err(FramecutError::InvalidOutputDimensions { width: 0, .. }) => {}
        other => panic!("expected fatal dimensions error, got {:?}", other.map(|_| ())),
    }
    assert!(renderer.cache().is_empty());
}

// ── Single image layer ─────────────────────────────────────────

#[tokio::test]
async fn single_image_layer_is_centered_and_contained() {
    init_tracing();
    // 2:1 still into a square canvas: letterboxed 64x32 band
    let (library, media_id) = image_library([200, 64, 32, 255], 32, 16);
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();

    let timeline = single_element_timeline(media_id, 0.0, 3.0);
    let snapshot = timeline.snapshot();

    let frame = renderer
        .composite(&snapshot, &settings, 1.5, 64, 64)
        .await
        .unwrap();

    // Centered band shows the image...
    assert_eq!(frame.pixel(32, 32), [200, 64, 32, 255]);
    // ...with background above and below.
    assert_eq!(frame.pixel(32, 8), [0, 0, 0, 255]);
    assert_eq!(frame.pixel(32, 56), [0, 0, 0, 255]);
}

#[tokio::test]
async fn time_past_the_element_renders_background_only() {
    let (library, media_id) = image_library([200, 64, 32, 255], 32, 16);
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();

    let snapshot = single_element_timeline(media_id, 0.0, 3.0).snapshot();
    let frame = renderer
        .composite(&snapshot, &settings, 3.5, 64, 64)
        .await
        .unwrap();
    assert_eq!(frame.pixel(32, 32), [0, 0, 0, 255]);
}

#[tokio::test]
async fn element_window_boundary_is_half_open() {
    let (library, media_id) = image_library([255, 255, 255, 255], 8, 8);
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();
    let snapshot = single_element_timeline(media_id, 0.0, 5.0).snapshot();

    let active = renderer
        .composite(&snapshot, &settings, 4.999, 64, 64)
        .await
        .unwrap();
    assert_eq!(active.pixel(32, 32), [255, 255, 255, 255]);

    let inactive = renderer
        .composite(&snapshot, &settings, 5.0, 64, 64)
        .await
        .unwrap();
    assert_eq!(inactive.pixel(32, 32), [0, 0, 0, 255]);
}

// ── Cache behavior ─────────────────────────────────────────────

#[tokio::test]
async fn repeated_composite_is_a_cache_hit() {
    let (library, media_id) = image_library([90, 90, 90, 255], 8, 8);
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();
    let snapshot = single_element_timeline(media_id, 0.0, 3.0).snapshot();

    let first = renderer
        .composite(&snapshot, &settings, 1.5, 64, 64)
        .await
        .unwrap();
    let second = renderer
        .composite(&snapshot, &settings, 1.5, 64, 64)
        .await
        .unwrap();

    // Same stored buffer, bitwise identical.
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
}

#[tokio::test]
async fn nearby_scrub_positions_share_a_cache_slot() {
    let (library, media_id) = image_library([90, 90, 90, 255], 8, 8);
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();
    let snapshot = single_element_timeline(media_id, 0.0, 3.0).snapshot();

    // Both times quantize to the same slot at the default cache fps.
    let a = renderer
        .composite(&snapshot, &settings, 1.005, 64, 64)
        .await
        .unwrap();
    let b = renderer
        .composite(&snapshot, &settings, 1.02, 64, 64)
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn each_output_size_gets_its_own_cached_frame() {
    let (library, media_id) = image_library([90, 90, 90, 255], 8, 8);
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();
    let snapshot = single_element_timeline(media_id, 0.0, 3.0).snapshot();

    let small = renderer
        .composite(&snapshot, &settings, 1.5, 64, 64)
        .await
        .unwrap();
    let large = renderer
        .composite(&snapshot, &settings, 1.5, 128, 128)
        .await
        .unwrap();
    assert_eq!((small.width, small.height), (64, 64));
    assert_eq!((large.width, large.height), (128, 128));

    // The original size still hits its own slot.
    let again = renderer
        .composite(&snapshot, &settings, 1.5, 64, 64)
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&small, &again));
}

#[tokio::test]
async fn structural_mutation_invalidates_cached_frames() {
    let (library, media_id) = image_library([90, 90, 90, 255], 8, 8);
    let white = library.register(
        MediaItem::new("white", MediaKind::Image, "white.png").with_dimensions(8, 8),
    );
    library.insert_still(
        white,
        Arc::new(framecut_core::FrameBuffer::solid(8, 8, [255, 255, 255, 255])),
    );

    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();

    let mut timeline = single_element_timeline(media_id, 0.0, 3.0);
    let before = renderer
        .composite(&timeline.snapshot(), &settings, 1.5, 64, 64)
        .await
        .unwrap();
    assert_eq!(before.pixel(32, 32), [90, 90, 90, 255]);

    // Stack a white element on a new track over the same window.
    let top = timeline.add_track(framecut_timeline::TrackKind::Media);
    timeline.add_element(
        top,
        Element::new("top", 0.0, 3.0).unwrap().with_media(white),
    );

    let after = renderer
        .composite(&timeline.snapshot(), &settings, 1.5, 64, 64)
        .await
        .unwrap();
    assert_eq!(after.pixel(32, 32), [255, 255, 255, 255]);
}

// ── Layer stacking and failure tolerance ───────────────────────

#[tokio::test]
async fn later_track_draws_on_top() {
    let (library, red) = image_library([255, 0, 0, 255], 8, 8);
    let blue = library.register(
        MediaItem::new("blue", MediaKind::Image, "blue.png").with_dimensions(8, 8),
    );
    library.insert_still(
        blue,
        Arc::new(framecut_core::FrameBuffer::solid(8, 8, [0, 0, 255, 255])),
    );

    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();

    let mut timeline = single_element_timeline(red, 0.0, 5.0);
    let top = timeline.add_track(framecut_timeline::TrackKind::Media);
    timeline.add_element(
        top,
        Element::new("top", 0.0, 5.0).unwrap().with_media(blue),
    );

    let frame = renderer
        .composite(&timeline.snapshot(), &settings, 2.0, 64, 64)
        .await
        .unwrap();
    assert_eq!(frame.pixel(32, 32), [0, 0, 255, 255]);
}

#[tokio::test]
async fn missing_media_skips_the_layer_not_the_frame() {
    init_tracing();
    let (library, _id) = image_library([255, 255, 255, 255], 8, 8);
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();

    let snapshot = single_element_timeline(Uuid::new_v4(), 0.0, 5.0).snapshot();
    let frame = renderer
        .composite(&snapshot, &settings, 1.0, 64, 64)
        .await
        .unwrap();
    assert_eq!(frame.pixel(32, 32), [0, 0, 0, 255]);
}

#[tokio::test]
async fn corrupt_video_source_renders_background() {
    let (library, media_id) = video_library(Arc::new(BrokenBackend), 10.0);
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();

    let snapshot = single_element_timeline(media_id, 0.0, 5.0).snapshot();
    let frame = renderer
        .composite(&snapshot, &settings, 1.0, 64, 64)
        .await
        .unwrap();
    assert_eq!(frame.pixel(32, 32), [0, 0, 0, 255]);
    // Failed frames are served but never cached.
    assert!(renderer.cache().is_empty());
}

#[tokio::test]
async fn failing_source_is_not_retried_within_the_backoff_window() {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    let backend = Arc::new(CountingBrokenBackend::default());
    let (library, media_id) = video_library(backend.clone(), 10.0);
    let config = EngineConfig {
        failure_backoff: Duration::from_secs(60),
        ..Default::default()
    };
    let renderer = Renderer::new(library, config);
    let settings = small_settings();
    let snapshot = single_element_timeline(media_id, 0.0, 5.0).snapshot();

    renderer
        .composite(&snapshot, &settings, 1.0, 64, 64)
        .await
        .unwrap();
    renderer
        .composite(&snapshot, &settings, 1.5, 64, 64)
        .await
        .unwrap();
    assert_eq!(backend.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_backoff_retries_the_source() {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    let backend = Arc::new(CountingBrokenBackend::default());
    let (library, media_id) = video_library(backend.clone(), 10.0);
    let config = EngineConfig {
        failure_backoff: Duration::ZERO,
        ..Default::default()
    };
    let renderer = Renderer::new(library, config);
    let settings = small_settings();
    let snapshot = single_element_timeline(media_id, 0.0, 5.0).snapshot();

    renderer
        .composite(&snapshot, &settings, 1.0, 64, 64)
        .await
        .unwrap();
    renderer
        .composite(&snapshot, &settings, 1.5, 64, 64)
        .await
        .unwrap();
    assert_eq!(backend.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn muted_track_does_not_composite() {
    let (library, media_id) = image_library([255, 255, 255, 255], 8, 8);
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();

    let mut timeline = single_element_timeline(media_id, 0.0, 5.0);
    timeline.tracks[0].muted = true;

    let frame = renderer
        .composite(&timeline.snapshot(), &settings, 1.0, 64, 64)
        .await
        .unwrap();
    assert_eq!(frame.pixel(32, 32), [0, 0, 0, 255]);
}

#[tokio::test]
async fn video_layer_composites_through_the_session() {
    let (library, media_id) = video_library(
        Arc::new(SolidBackend {
            color: [10, 200, 10, 255],
            width: 32,
            height: 32,
        }),
        10.0,
    );
    let renderer = Renderer::new(library, EngineConfig::default());
    let settings = small_settings();

    let snapshot = single_element_timeline(media_id, 0.0, 5.0).snapshot();
    let frame = renderer
        .composite(&snapshot, &settings, 2.0, 64, 64)
        .await
        .unwrap();
    assert_eq!(frame.pixel(32, 32), [10, 200, 10, 255]);
}

// ── Blur background ────────────────────────────────────────────

#[tokio::test]
async fn blur_background_fills_the_letterbox() {
    let (library, media_id) = image_library([200, 200, 200, 255], 32, 16);
    let renderer = Renderer::new(library, EngineConfig::default());

    let mut settings = small_settings();
    settings.background = Background::Blur { intensity: 4 };

    let snapshot = single_element_timeline(media_id, 0.0, 3.0).snapshot();
    let frame = renderer
        .composite(&snapshot, &settings, 1.5, 64, 64)
        .await
        .unwrap();

    // The letterbox region derives from the layer, not plain black.
    let [r, g, b, _] = frame.pixel(32, 4);
    assert!(r > 0 && g > 0 && b > 0, "letterbox = {r},{g},{b}");
}
