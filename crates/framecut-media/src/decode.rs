//! Decode backends: one blocking seek-and-decode call per request.
//!
//! The backend is the seam between the decoder session (which owns
//! scheduling, coalescing and supersession) and the actual pixel source.
//! Production uses FFmpeg via ffmpeg-sidecar; tests and ffmpeg-less
//! environments use the synthetic test-pattern backend.

use framecut_core::{FrameBuffer, FramecutError, PixelFormat, Result};
use std::path::Path;
use tracing::debug;

/// A blocking decode of the frame nearest `time` from a media file.
pub trait DecodeBackend: Send + Sync + 'static {
    fn decode_at(&self, path: &Path, time: f64) -> Result<FrameBuffer>;
}

/// FFmpeg-backed decoding via ffmpeg-sidecar.
///
/// Spawns FFmpeg with an input seek and reads a single rawvideo frame
/// from the pipe. Input seeking keeps the decode cost bounded for long
/// sources.
#[derive(Debug, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DecodeBackend for FfmpegBackend {
    fn decode_at(&self, path: &Path, time: f64) -> Result<FrameBuffer> {
        use ffmpeg_sidecar::command::FfmpegCommand;

        debug!(path = %path.display(), time, "ffmpeg seek+decode");

        let mut child = FfmpegCommand::new()
            .args(["-ss", &format!("{time:.3}")])
            .input(path.to_string_lossy().as_ref())
            .args(["-frames:v", "1"])
            .rawvideo()
            .spawn()
            .map_err(|e| FramecutError::Decode(format!("failed to spawn ffmpeg: {e}")))?;

        let iter = child
            .iter()
            .map_err(|e| FramecutError::Decode(format!("ffmpeg output unavailable: {e}")))?;

        let frame = iter
            .filter_frames()
            .next()
            .ok_or_else(|| FramecutError::Decode("ffmpeg produced no frame".into()))?;

        // rawvideo output is rgb24; expand to the engine's RGBA8
        rgb24_to_rgba8(frame.width, frame.height, &frame.data)
            .ok_or_else(|| FramecutError::Decode("short frame from ffmpeg".into()))
    }
}

fn rgb24_to_rgba8(width: u32, height: u32, rgb: &[u8]) -> Option<FrameBuffer> {
    let pixels = (width as usize) * (height as usize);
    if rgb.len() < pixels * 3 {
        return None;
    }
    let mut frame = FrameBuffer::new(width, height, PixelFormat::Rgba8);
    let plane = frame.primary_plane_mut();
    for y in 0..height {
        let src = &rgb[y as usize * width as usize * 3..];
        let row = plane.row_mut(y);
        for x in 0..width as usize {
            row[x * 4] = src[x * 3];
            row[x * 4 + 1] = src[x * 3 + 1];
            row[x * 4 + 2] = src[x * 3 + 2];
            row[x * 4 + 3] = 255;
        }
    }
    Some(frame)
}

/// Synthetic backend producing color-bar frames, ignoring the file.
///
/// Stands in for FFmpeg in tests and on machines without it.
#[derive(Debug, Clone, Copy)]
pub struct TestPatternBackend {
    pub width: u32,
    pub height: u32,
}

impl TestPatternBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl DecodeBackend for TestPatternBackend {
    fn decode_at(&self, _path: &Path, _time: f64) -> Result<FrameBuffer> {
        Ok(FrameBuffer::test_pattern(self.width, self.height))
    }
}
