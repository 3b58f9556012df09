use anyhow::{Context, Result};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect as SkRect, Stroke, Transform};

use crate::geometry::crop::CropRect;

const DIM_ALPHA: u8 = 128;
const GUIDE_ALPHA: u8 = 140;
const MARKER_LENGTH: f32 = 16.0;
const MARKER_WIDTH: f32 = 3.0;

fn paint(r: u8, g: u8, b: u8, a: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(r, g, b, a));
    paint.anti_alias = false;
    paint
}

fn fill(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, paint: &Paint) {
    if let Some(rect) = SkRect::from_xywh(x, y, w, h) {
        pixmap.fill_rect(rect, paint, Transform::identity(), None);
    }
}

/// Draw the interactive crop interface over a padded canvas.
///
/// `rect` is in canvas coordinates. Everything outside it is dimmed; inside
/// go the rule-of-thirds guides, a hairline border and L-shaped corner
/// markers sized by `scale`.
pub fn draw_crop_overlay(pixmap: &mut Pixmap, rect: CropRect, scale: f32) -> Result<()> {
    let r = rect.normalized();
    let (x, y, w, h) = (r.x as f32, r.y as f32, r.width as f32, r.height as f32);
    let (cw, ch) = (pixmap.width() as f32, pixmap.height() as f32);

    let dim = paint(0, 0, 0, DIM_ALPHA);
    fill(pixmap, 0.0, 0.0, cw, y, &dim);
    fill(pixmap, 0.0, y + h, cw, ch - y - h, &dim);
    fill(pixmap, 0.0, y, x, h, &dim);
    fill(pixmap, x + w, y, cw - x - w, h, &dim);

    if w <= 0.0 || h <= 0.0 {
        return Ok(());
    }

    let mut guides = PathBuilder::new();
    for i in 1..3 {
        let gx = x + w * i as f32 / 3.0;
        let gy = y + h * i as f32 / 3.0;
        guides.move_to(gx, y);
        guides.line_to(gx, y + h);
        guides.move_to(x, gy);
        guides.line_to(x + w, gy);
    }
    let guides = guides.finish().context("empty crop guide path")?;
    let hairline = Stroke {
        width: scale.max(1.0),
        ..Stroke::default()
    };
    pixmap.stroke_path(
        &guides,
        &paint(255, 255, 255, GUIDE_ALPHA),
        &hairline,
        Transform::identity(),
        None,
    );

    let border = PathBuilder::from_rect(SkRect::from_xywh(x, y, w, h).context("invalid crop rect")?);
    pixmap.stroke_path(
        &border,
        &paint(255, 255, 255, 255),
        &hairline,
        Transform::identity(),
        None,
    );

    let len = (MARKER_LENGTH * scale).min(w / 2.0).min(h / 2.0);
    let thick = MARKER_WIDTH * scale;
    let white = paint(255, 255, 255, 255);
    for (cx, cy, sx, sy) in [
        (x, y, 1.0, 1.0),
        (x + w, y, -1.0, 1.0),
        (x, y + h, 1.0, -1.0),
        (x + w, y + h, -1.0, -1.0),
    ] {
        let ox = if sx > 0.0 { cx - thick } else { cx - len };
        let oy = if sy > 0.0 { cy - thick } else { cy };
        fill(pixmap, ox, oy, len + thick, thick, &white);
        let ox = if sx > 0.0 { cx - thick } else { cx };
        let oy = if sy > 0.0 { cy - thick } else { cy - len };
        fill(pixmap, ox, oy, thick, len + thick, &white);
    }
    Ok(())
}
