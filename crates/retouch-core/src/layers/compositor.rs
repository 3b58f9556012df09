use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::surface::Surface;

/// Straight-alpha source-over of one pixel.
pub fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    match (src[3], dst[3]) {
        (0, _) => return dst,
        (255, _) | (_, 0) => return src,
        _ => {}
    }
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let oa = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / oa;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (oa * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

pub fn over_in_place(dst: &mut Surface, src: &Surface) -> Result<()> {
    ensure!(
        dst.width == src.width && dst.height == src.height,
        "layer size mismatch: {}x{} over {}x{}",
        src.width,
        src.height,
        dst.width,
        dst.height
    );
    for (d, s) in dst.data.chunks_exact_mut(4).zip(src.data.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Where an overlay sits on the source, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

/// Pre-rendered sticker or text block.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub id: String,
    pub placement: Placement,
    pub surface: Surface,
}

impl Overlay {
    /// Source-over onto `dst`, scaled with nearest sampling.
    pub fn draw_onto(&self, dst: &mut Surface) {
        let scale = self.placement.scale;
        if !(scale > 0.0) || self.surface.is_empty() {
            return;
        }
        let w = (self.surface.width as f32 * scale).round() as i64;
        let h = (self.surface.height as f32 * scale).round() as i64;
        let ox = self.placement.x.round() as i64;
        let oy = self.placement.y.round() as i64;

        for ty in oy.max(0)..(oy + h).min(dst.height as i64) {
            let sy = (((ty - oy) as f32 + 0.5) / scale) as i64;
            for tx in ox.max(0)..(ox + w).min(dst.width as i64) {
                let sx = (((tx - ox) as f32 + 0.5) / scale) as i64;
                let src = self.surface.pixel(sx, sy);
                if src[3] == 0 {
                    continue;
                }
                let below = dst.pixel(tx, ty);
                dst.set_pixel(tx as u32, ty as u32, over(below, src));
            }
        }
    }
}

/// Color output, then brush, then overlays in insertion order.
pub fn merge(color: &Surface, brush: &Surface, overlays: &[Overlay]) -> Result<Surface> {
    let mut merged = color.clone();
    over_in_place(&mut merged, brush)?;
    for overlay in overlays {
        overlay.draw_onto(&mut merged);
    }
    Ok(merged)
}
