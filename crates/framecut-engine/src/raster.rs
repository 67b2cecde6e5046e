//! CPU raster operations: scaled blits, cover fill, box blur.

use framecut_core::{contain_fit, FrameBuffer, PixelFormat};

/// Composite `src` onto `dst` with contain-fit placement: aspect ratio
/// preserved, centered, letterbox/pillarbox as needed. Alpha-over
/// blending; sampling is nearest-neighbor.
pub fn blit_contain(dst: &mut FrameBuffer, src: &FrameBuffer) {
    if src.width == 0 || src.height == 0 {
        return;
    }
    let rect = contain_fit(src.width, src.height, dst.width, dst.height);
    let src_plane = src.primary_plane();
    let sx_step = src.width as f64 / rect.width as f64;
    let sy_step = src.height as f64 / rect.height as f64;
    let dst_plane = dst.primary_plane_mut();

    for dy in 0..rect.height {
        let sy = ((dy as f64 * sy_step) as u32).min(src_plane.height.saturating_sub(1));
        let src_row = src_plane.row(sy);
        let dst_row = dst_plane.row_mut(rect.y + dy);
        for dx in 0..rect.width {
            let sx = ((dx as f64 * sx_step) as usize).min(src_plane.width as usize - 1);
            let s = &src_row[sx * 4..sx * 4 + 4];
            let d = &mut dst_row[(rect.x + dx) as usize * 4..(rect.x + dx) as usize * 4 + 4];
            blend_over(d, s);
        }
    }
}

/// Alpha-over: src over dst, output alpha forced opaque.
#[inline]
fn blend_over(dst: &mut [u8], src: &[u8]) {
    let alpha = src[3] as f32 / 255.0;
    for c in 0..3 {
        dst[c] = (src[c] as f32 * alpha + dst[c] as f32 * (1.0 - alpha)) as u8;
    }
    dst[3] = 255;
}

/// Scale `src` to cover the whole `width`x`height` area (aspect ratio
/// preserved, center-cropped). Used to derive the blur background.
pub fn cover_scale(src: &FrameBuffer, width: u32, height: u32) -> FrameBuffer {
    let mut out = FrameBuffer::new(width, height, PixelFormat::Rgba8);
    if src.width == 0 || src.height == 0 || width == 0 || height == 0 {
        out.fill([0, 0, 0, 255]);
        return out;
    }
    let scale = (width as f64 / src.width.max(1) as f64)
        .max(height as f64 / src.height.max(1) as f64);
    let crop_w = width as f64 / scale;
    let crop_h = height as f64 / scale;
    let off_x = (src.width as f64 - crop_w) / 2.0;
    let off_y = (src.height as f64 - crop_h) / 2.0;

    let src_plane = src.primary_plane();
    let out_plane = out.primary_plane_mut();
    for y in 0..height {
        let sy = ((off_y + y as f64 * crop_h / height as f64) as u32)
            .min(src_plane.height.saturating_sub(1));
        let src_row = src_plane.row(sy);
        let out_row = out_plane.row_mut(y);
        for x in 0..width {
            let sx = ((off_x + x as f64 * crop_w / width as f64) as usize)
                .min(src_plane.width as usize - 1);
            out_row[x as usize * 4..x as usize * 4 + 4]
                .copy_from_slice(&src_row[sx * 4..sx * 4 + 4]);
        }
    }
    out
}

/// Separable box blur, `radius` pixels per axis, one pass each.
pub fn box_blur(frame: &mut FrameBuffer, radius: u32) {
    if radius == 0 || frame.width == 0 || frame.height == 0 {
        return;
    }
    let r = radius as i64;
    let (w, h) = (frame.width as i64, frame.height as i64);
    let plane = frame.primary_plane_mut();

    // Horizontal pass
    let mut pass = vec![0u8; (w * h * 4) as usize];
    for y in 0..h {
        let row = plane.row(y as u32);
        for x in 0..w {
            let mut acc = [0u32; 4];
            let mut count = 0u32;
            for sx in (x - r).max(0)..=(x + r).min(w - 1) {
                for c in 0..4 {
                    acc[c] += row[(sx * 4 + c as i64) as usize] as u32;
                }
                count += 1;
            }
            let out = &mut pass[((y * w + x) * 4) as usize..((y * w + x) * 4 + 4) as usize];
            for c in 0..4 {
                out[c] = (acc[c] / count) as u8;
            }
        }
    }

    // Vertical pass back into the frame
    for y in 0..h {
        let row = plane.row_mut(y as u32);
        for x in 0..w {
            let mut acc = [0u32; 4];
            let mut count = 0u32;
            for sy in (y - r).max(0)..=(y + r).min(h - 1) {
                let px = &pass[((sy * w + x) * 4) as usize..((sy * w + x) * 4 + 4) as usize];
                for c in 0..4 {
                    acc[c] += px[c] as u32;
                }
                count += 1;
            }
            for c in 0..4 {
                row[(x * 4 + c as i64) as usize] = (acc[c] / count) as u8;
            }
        }
    }
}

/// Draw the blurred, cover-fit background derived from a source frame.
pub fn blur_background(dst: &mut FrameBuffer, src: &FrameBuffer, intensity: u32) {
    let mut bg = cover_scale(src, dst.width, dst.height);
    box_blur(&mut bg, intensity);
    let src_plane = bg.primary_plane();
    let dst_plane = dst.primary_plane_mut();
    for y in 0..dst_plane.height {
        let from = src_plane.row(y);
        dst_plane.row_mut(y).copy_from_slice(from);
    }
}
