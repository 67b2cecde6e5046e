//! Geometric primitives and contain-fit placement.

use bytemuck::{Pod, Zeroable};
use glam::Vec2 as GlamVec2;
use serde::{Deserialize, Serialize};

/// 2D vector.
pub type Vec2 = GlamVec2;

/// Axis-aligned rectangle in continuous coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Minimum corner (top-left).
    #[inline]
    pub fn min(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Maximum corner (bottom-right).
    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Check if a point is inside the rectangle.
    pub fn contains(self, p: Vec2) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.x + self.width && p.y < self.y + self.height
    }
}

/// Integer pixel rectangle describing where a layer lands on the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Scale a source rectangle to fit entirely within the destination while
/// preserving aspect ratio, centered (letterbox/pillarbox as needed).
///
/// Scaled dimensions and offsets are floored, with a minimum of 1 px in
/// each dimension so degenerate sources still produce a drawable rect.
pub fn contain_fit(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> DrawRect {
    let src_w_f = src_w.max(1) as f64;
    let src_h_f = src_h.max(1) as f64;
    let scale = (dst_w as f64 / src_w_f).min(dst_h as f64 / src_h_f);
    let draw_w = ((src_w_f * scale).floor() as u32).max(1);
    let draw_h = ((src_h_f * scale).floor() as u32).max(1);
    let x = (dst_w.saturating_sub(draw_w)) / 2;
    let y = (dst_h.saturating_sub(draw_h)) / 2;
    DrawRect {
        x,
        y,
        width: draw_w,
        height: draw_h,
    }
}
