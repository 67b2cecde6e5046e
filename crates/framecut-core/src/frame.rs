//! Frame buffer types for composited frames in CPU memory.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// Pixel format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA (32 bits per pixel)
    #[default]
    Rgba8,
    /// 8-bit grayscale
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Gray8 => 1,
        }
    }
}

/// A plane of pixel data with stride information.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlane {
    /// Raw pixel data
    pub data: Vec<u8>,
    /// Bytes per row (may include padding)
    pub stride: usize,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bytes per pixel
    pub bytes_per_pixel: usize,
}

impl FramePlane {
    /// Create a new frame plane with the given dimensions.
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize) -> Self {
        // Align stride to 64 bytes for SIMD compatibility
        let min_stride = (width as usize) * bytes_per_pixel;
        let stride = (min_stride + 63) & !63;
        let data = vec![0u8; stride * height as usize];
        Self {
            data,
            stride,
            width,
            height,
            bytes_per_pixel,
        }
    }

    /// Get a row of pixel data.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        let end = start + (self.width as usize * self.bytes_per_pixel);
        &self.data[start..end]
    }

    /// Get a mutable row of pixel data.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let end = start + (self.width as usize * self.bytes_per_pixel);
        &mut self.data[start..end]
    }
}

/// A raster frame in CPU memory.
///
/// Compositing output and decoded source frames share this type; the
/// compositor works in RGBA8 throughout.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    /// Pixel format
    pub format: PixelFormat,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel data planes
    pub planes: SmallVec<[FramePlane; 1]>,
}

impl FrameBuffer {
    /// Create a new zeroed frame buffer with the given dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let planes = smallvec::smallvec![FramePlane::new(width, height, format.bytes_per_pixel())];
        Self {
            format,
            width,
            height,
            planes,
        }
    }

    /// Create an RGBA8 frame filled with a solid color.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut frame = Self::new(width, height, PixelFormat::Rgba8);
        frame.fill(color);
        frame
    }

    /// Create an RGBA8 frame from tightly packed pixel data.
    ///
    /// Returns `None` if `data` is shorter than `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Option<Self> {
        let row_bytes = width as usize * 4;
        if data.len() < row_bytes * height as usize {
            return None;
        }
        let mut frame = Self::new(width, height, PixelFormat::Rgba8);
        let plane = frame.primary_plane_mut();
        for y in 0..height {
            let src = &data[y as usize * row_bytes..(y as usize + 1) * row_bytes];
            plane.row_mut(y).copy_from_slice(src);
        }
        Some(frame)
    }

    /// Fill the whole frame with a solid RGBA color.
    pub fn fill(&mut self, color: [u8; 4]) {
        let plane = self.primary_plane_mut();
        for y in 0..plane.height {
            let row = plane.row_mut(y);
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }
    }

    /// Total memory usage of this frame in bytes.
    pub fn memory_size(&self) -> usize {
        self.planes.iter().map(|p| p.data.len()).sum()
    }

    /// Get the primary plane (plane 0).
    #[inline]
    pub fn primary_plane(&self) -> &FramePlane {
        &self.planes[0]
    }

    /// Get the primary plane mutably.
    #[inline]
    pub fn primary_plane_mut(&mut self) -> &mut FramePlane {
        &mut self.planes[0]
    }

    /// Read one RGBA pixel.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let row = self.primary_plane().row(y);
        let i = x as usize * 4;
        [row[i], row[i + 1], row[i + 2], row[i + 3]]
    }

    /// Create a test pattern frame (color bars).
    pub fn test_pattern(width: u32, height: u32) -> Self {
        let mut frame = Self::new(width, height, PixelFormat::Rgba8);
        let plane = frame.primary_plane_mut();

        const COLORS: [[u8; 4]; 8] = [
            [255, 255, 255, 255], // White
            [255, 255, 0, 255],   // Yellow
            [0, 255, 255, 255],   // Cyan
            [0, 255, 0, 255],     // Green
            [255, 0, 255, 255],   // Magenta
            [255, 0, 0, 255],     // Red
            [0, 0, 255, 255],     // Blue
            [0, 0, 0, 255],       // Black
        ];

        for y in 0..height {
            let row = plane.row_mut(y);
            for x in 0..width {
                let i = (x * 4) as usize;
                let bar = (x * 8 / width).min(7) as usize;
                row[i..i + 4].copy_from_slice(&COLORS[bar]);
            }
        }

        frame
    }
}

/// Arc-wrapped frame buffer for shared ownership.
///
/// Cache entries and decoder results hand these out; receivers must copy
/// before mutating.
pub type SharedFrameBuffer = Arc<FrameBuffer>;
