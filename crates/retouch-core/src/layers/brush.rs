use anyhow::{Context, Result};
use image::imageops;
use serde::{Deserialize, Serialize};
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pattern, Pixmap,
    PixmapPaint, SpreadMode, Stroke, Transform,
};
use tracing::debug;

use crate::color::Rgba;
use crate::surface::Surface;

/// Sigma of the copy painted by the blur tool.
const BLUR_SIGMA: f32 = 6.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushTool {
    #[default]
    Pen,
    Arrow,
    Brush,
    Neon,
    Blur,
    Eraser,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    /// Diameter.
    pub size: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self { x, y, size }
    }
}

/// One pointer-down..pointer-up gesture. Append-only while active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrushStroke {
    pub points: Vec<StrokePoint>,
    pub color: Rgba,
    pub tool: BrushTool,
}

/// Brush parameters for the next stroke.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub color: Rgba,
    pub tool: BrushTool,
    pub size: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: Rgba::PRESETS[1],
            tool: BrushTool::Pen,
            size: 15.0,
        }
    }
}

impl BrushSettings {
    pub const MIN_SIZE: f32 = 1.0;
    pub const MAX_SIZE: f32 = 100.0;

    pub fn clamp_size(size: f32) -> f32 {
        if size.is_nan() {
            return Self::default().size;
        }
        size.clamp(Self::MIN_SIZE, Self::MAX_SIZE)
    }
}

// ── Passes ──────────────────────────────────────────────────────────────
//
// A stroke is rasterized opaque into one scratch pixmap per pass, then each
// pass is composited with its own opacity and blend mode. Overlapping dabs
// inside one stroke therefore never stack up their alpha.

#[derive(Clone, Copy, Debug, PartialEq)]
enum Ink {
    Solid(Rgba),
    Backdrop,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Pass {
    width_scale: f32,
    ink: Ink,
    opacity: f32,
    blend: BlendMode,
}

fn passes(tool: BrushTool, color: Rgba) -> Vec<Pass> {
    let pass = |width_scale, ink, opacity| Pass {
        width_scale,
        ink,
        opacity,
        blend: BlendMode::SourceOver,
    };
    let color = color.with_alpha(255);
    match tool {
        BrushTool::Pen | BrushTool::Arrow => vec![pass(1.0, Ink::Solid(color), 1.0)],
        BrushTool::Brush => vec![pass(1.0, Ink::Solid(color), 0.5)],
        BrushTool::Neon => vec![
            pass(2.0, Ink::Solid(color), 0.35),
            pass(0.5, Ink::Solid(color.blended(0.6, 0.0)), 1.0),
        ],
        BrushTool::Blur => vec![pass(1.0, Ink::Backdrop, 1.0)],
        BrushTool::Eraser => vec![Pass {
            blend: BlendMode::DestinationOut,
            ..pass(1.0, Ink::Solid(Rgba::WHITE), 1.0)
        }],
    }
}

fn solid_paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn ink_paint<'a>(ink: Ink, backdrop: Option<&'a Pixmap>) -> Option<Paint<'a>> {
    match ink {
        Ink::Solid(color) => Some(solid_paint(color)),
        Ink::Backdrop => {
            let backdrop = backdrop?;
            let mut paint = Paint::default();
            paint.shader = Pattern::new(
                backdrop.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                1.0,
                Transform::identity(),
            );
            paint.anti_alias = true;
            Some(paint)
        }
    }
}

/// Dab at `to` joined to `from` by a round-capped segment.
fn draw_segment(target: &mut Pixmap, from: Option<StrokePoint>, to: StrokePoint, scale: f32, paint: &Paint) {
    let diameter = (to.size * scale).max(1.0);
    if let Some(circle) = PathBuilder::from_circle(to.x, to.y, diameter / 2.0) {
        target.fill_path(&circle, paint, FillRule::Winding, Transform::identity(), None);
    }
    let Some(from) = from else {
        return;
    };
    let mut pb = PathBuilder::new();
    pb.move_to(from.x, from.y);
    pb.line_to(to.x, to.y);
    if let Some(line) = pb.finish() {
        let stroke = Stroke {
            width: diameter,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        target.stroke_path(&line, paint, &stroke, Transform::identity(), None);
    }
}

/// Triangle at the last point, pointing along the last segment.
fn draw_arrowhead(target: &mut Pixmap, points: &[StrokePoint], color: Rgba) {
    let Some(&tip) = points.last() else {
        return;
    };
    let Some(&tail) = points
        .iter()
        .rev()
        .find(|p| (p.x - tip.x).hypot(p.y - tip.y) > f32::EPSILON)
    else {
        return;
    };
    let (dx, dy) = (tip.x - tail.x, tip.y - tail.y);
    let len = dx.hypot(dy);
    let (ux, uy) = (dx / len, dy / len);
    let head = (tip.size * 3.0).max(12.0);
    let half = head * 0.6;

    let (fx, fy) = (tip.x + ux * head / 2.0, tip.y + uy * head / 2.0);
    let (bx, by) = (tip.x - ux * head / 2.0, tip.y - uy * head / 2.0);
    let mut pb = PathBuilder::new();
    pb.move_to(fx, fy);
    pb.line_to(bx - uy * half, by + ux * half);
    pb.line_to(bx + uy * half, by - ux * half);
    pb.close();
    if let Some(path) = pb.finish() {
        target.fill_path(
            &path,
            &solid_paint(color.with_alpha(255)),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

fn compose(target: &mut Pixmap, scratch: &Pixmap, pass: &Pass) {
    let paint = PixmapPaint {
        opacity: pass.opacity,
        blend_mode: pass.blend,
        quality: FilterQuality::Nearest,
    };
    target.draw_pixmap(0, 0, scratch.as_ref(), &paint, Transform::identity(), None);
}

/// Stroke currently under the pointer, with its per-pass scratch layers.
#[derive(Clone, Debug)]
struct ActiveStroke {
    stroke: BrushStroke,
    passes: Vec<(Pass, Pixmap)>,
}

// ── Layer ───────────────────────────────────────────────────────────────

/// Freehand drawing layer, sized to the source image.
pub struct BrushLayer {
    base: Pixmap,
    strokes: Vec<BrushStroke>,
    active: Option<ActiveStroke>,
    backdrop: Option<Pixmap>,
}

impl BrushLayer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let base = Pixmap::new(width, height)
            .with_context(|| format!("cannot allocate {width}x{height} brush layer"))?;
        Ok(Self {
            base,
            strokes: Vec::new(),
            active: None,
            backdrop: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.base.width()
    }

    pub fn height(&self) -> u32 {
        self.base.height()
    }

    /// Finished strokes in z-order.
    pub fn strokes(&self) -> &[BrushStroke] {
        &self.strokes
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.active.is_none()
    }

    /// Provide the color-stage output the blur tool paints with.
    pub fn set_backdrop(&mut self, color_output: &Surface) -> Result<()> {
        let blurred = imageops::blur(&color_output.to_rgba_image()?, BLUR_SIGMA);
        self.backdrop = Some(Surface::from_rgba_image(blurred).to_pixmap()?);
        Ok(())
    }

    pub fn has_backdrop(&self) -> bool {
        self.backdrop.is_some()
    }

    pub fn begin_stroke(&mut self, point: StrokePoint, color: Rgba, tool: BrushTool) -> Result<()> {
        if self.active.is_some() {
            self.end_stroke();
        }
        let mut scratch = Vec::new();
        for pass in passes(tool, color) {
            let pixmap = Pixmap::new(self.width(), self.height())
                .context("cannot allocate stroke scratch layer")?;
            scratch.push((pass, pixmap));
        }
        let mut active = ActiveStroke {
            stroke: BrushStroke {
                points: Vec::new(),
                color,
                tool,
            },
            passes: scratch,
        };
        self.extend_active(&mut active, point);
        self.active = Some(active);
        Ok(())
    }

    /// Append a point, drawing only the new segment. Returns `false` when
    /// no stroke is in progress.
    pub fn extend_stroke(&mut self, point: StrokePoint) -> bool {
        let Some(mut active) = self.active.take() else {
            return false;
        };
        self.extend_active(&mut active, point);
        self.active = Some(active);
        true
    }

    fn extend_active(&self, active: &mut ActiveStroke, point: StrokePoint) {
        let prev = active.stroke.points.last().copied();
        for (pass, scratch) in &mut active.passes {
            if let Some(paint) = ink_paint(pass.ink, self.backdrop.as_ref()) {
                draw_segment(scratch, prev, point, pass.width_scale, &paint);
            }
        }
        active.stroke.points.push(point);
    }

    /// Freeze the active stroke onto the layer.
    pub fn end_stroke(&mut self) -> Option<&BrushStroke> {
        let active = self.active.take()?;
        for (pass, scratch) in &active.passes {
            compose(&mut self.base, scratch, pass);
        }
        if active.stroke.tool == BrushTool::Arrow {
            draw_arrowhead(&mut self.base, &active.stroke.points, active.stroke.color);
        }
        debug!(
            tool = ?active.stroke.tool,
            points = active.stroke.points.len(),
            "stroke finished"
        );
        self.strokes.push(active.stroke);
        self.strokes.last()
    }

    /// Drop the last finished stroke and rebuild.
    pub fn pop_stroke(&mut self) -> Result<Option<BrushStroke>> {
        let popped = self.strokes.pop();
        if popped.is_some() {
            self.redraw()?;
        }
        Ok(popped)
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.active = None;
        self.base.fill(tiny_skia::Color::TRANSPARENT);
    }

    /// Replay every finished stroke from scratch.
    pub fn redraw(&mut self) -> Result<()> {
        self.base.fill(tiny_skia::Color::TRANSPARENT);
        for stroke in &self.strokes {
            for pass in passes(stroke.tool, stroke.color) {
                let mut scratch = Pixmap::new(self.base.width(), self.base.height())
                    .context("cannot allocate stroke scratch layer")?;
                if let Some(paint) = ink_paint(pass.ink, self.backdrop.as_ref()) {
                    let mut prev = None;
                    for &point in &stroke.points {
                        draw_segment(&mut scratch, prev, point, pass.width_scale, &paint);
                        prev = Some(point);
                    }
                }
                compose(&mut self.base, &scratch, &pass);
            }
            if stroke.tool == BrushTool::Arrow {
                draw_arrowhead(&mut self.base, &stroke.points, stroke.color);
            }
        }
        debug!(strokes = self.strokes.len(), "brush layer redrawn");
        Ok(())
    }

    /// Current look of the layer, including the stroke in progress.
    pub fn surface(&self) -> Surface {
        let Some(active) = &self.active else {
            return Surface::from_pixmap(&self.base);
        };
        let mut view = self.base.clone();
        for (pass, scratch) in &active.passes {
            compose(&mut view, scratch, pass);
        }
        if active.stroke.tool == BrushTool::Arrow {
            draw_arrowhead(&mut view, &active.stroke.points, active.stroke.color);
        }
        Surface::from_pixmap(&view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::opaque(255, 0, 0);

    fn line(layer: &mut BrushLayer, tool: BrushTool, color: Rgba, from: (f32, f32), to: (f32, f32)) {
        layer
            .begin_stroke(StrokePoint::new(from.0, from.1, 6.0), color, tool)
            .unwrap();
        for i in 1..=10 {
            let t = i as f32 / 10.0;
            layer.extend_stroke(StrokePoint::new(
                from.0 + (to.0 - from.0) * t,
                from.1 + (to.1 - from.1) * t,
                6.0,
            ));
        }
        layer.end_stroke();
    }

    #[test]
    fn pen_stroke_is_continuous() {
        let mut layer = BrushLayer::new(64, 32).unwrap();
        line(&mut layer, BrushTool::Pen, RED, (5.0, 16.0), (59.0, 16.0));
        let s = layer.surface();
        for x in 5..59 {
            assert_eq!(s.pixel(x, 16), [255, 0, 0, 255], "gap at x={x}");
        }
        assert_eq!(s.pixel(32, 2), [0; 4]);
    }

    #[test]
    fn brush_tool_is_half_transparent_without_stacking() {
        let mut layer = BrushLayer::new(64, 32).unwrap();
        line(&mut layer, BrushTool::Brush, RED, (5.0, 16.0), (59.0, 16.0));
        let s = layer.surface();
        let a = s.pixel(30, 16)[3];
        assert!((126..=129).contains(&a), "alpha {a}");
        assert_eq!(s.pixel(31, 16)[3], a);
    }

    #[test]
    fn eraser_clears_earlier_strokes() {
        let mut layer = BrushLayer::new(64, 32).unwrap();
        line(&mut layer, BrushTool::Pen, RED, (5.0, 16.0), (59.0, 16.0));
        line(&mut layer, BrushTool::Eraser, RED, (32.0, 0.0), (32.0, 31.0));
        let s = layer.surface();
        assert_eq!(s.pixel(32, 16)[3], 0);
        assert_eq!(s.pixel(10, 16), [255, 0, 0, 255]);
    }

    #[test]
    fn arrowhead_follows_last_segment() {
        let mut layer = BrushLayer::new(64, 64).unwrap();
        line(&mut layer, BrushTool::Arrow, RED, (5.0, 32.0), (40.0, 32.0));
        let s = layer.surface();
        // head of 18px extends 9px past the tip, wider than the 6px line
        assert_eq!(s.pixel(46, 32)[3], 255);
        assert_eq!(s.pixel(36, 37)[3], 255);
        assert_eq!(s.pixel(20, 38)[3], 0);
    }

    #[test]
    fn arrowhead_is_not_left_behind_while_drawing() {
        let mut layer = BrushLayer::new(64, 64).unwrap();
        layer
            .begin_stroke(StrokePoint::new(5.0, 32.0, 6.0), RED, BrushTool::Arrow)
            .unwrap();
        layer.extend_stroke(StrokePoint::new(20.0, 32.0, 6.0));
        assert_eq!(layer.surface().pixel(17, 37)[3], 255);
        layer.extend_stroke(StrokePoint::new(50.0, 32.0, 6.0));
        assert_eq!(layer.surface().pixel(17, 37)[3], 0);
    }

    #[test]
    fn redraw_matches_incremental() {
        let mut layer = BrushLayer::new(64, 64).unwrap();
        line(&mut layer, BrushTool::Pen, RED, (5.0, 5.0), (60.0, 60.0));
        line(&mut layer, BrushTool::Neon, Rgba::PRESETS[6], (5.0, 60.0), (60.0, 5.0));
        line(&mut layer, BrushTool::Arrow, Rgba::WHITE, (10.0, 32.0), (50.0, 32.0));
        let incremental = layer.surface();
        layer.redraw().unwrap();
        assert_eq!(layer.surface(), incremental);
    }

    #[test]
    fn blur_tool_paints_from_backdrop() {
        let mut layer = BrushLayer::new(32, 32).unwrap();
        layer
            .set_backdrop(&Surface::filled(32, 32, [0, 200, 0, 255]))
            .unwrap();
        line(&mut layer, BrushTool::Blur, RED, (4.0, 16.0), (28.0, 16.0));
        let p = layer.surface().pixel(16, 16);
        assert!(p[3] > 240, "{p:?}");
        assert!(p[1] > 150 && p[0] < 20, "{p:?}");
    }

    #[test]
    fn blur_without_backdrop_draws_nothing() {
        let mut layer = BrushLayer::new(32, 32).unwrap();
        line(&mut layer, BrushTool::Blur, RED, (4.0, 16.0), (28.0, 16.0));
        assert!(layer.surface().data.iter().all(|&v| v == 0));
        assert_eq!(layer.strokes().len(), 1);
    }

    #[test]
    fn pop_stroke_rebuilds() {
        let mut layer = BrushLayer::new(32, 32).unwrap();
        line(&mut layer, BrushTool::Pen, RED, (4.0, 16.0), (28.0, 16.0));
        layer.pop_stroke().unwrap();
        assert!(layer.is_empty());
        assert!(layer.surface().data.iter().all(|&v| v == 0));
    }

    #[test]
    fn size_is_clamped() {
        assert_eq!(BrushSettings::clamp_size(0.0), 1.0);
        assert_eq!(BrushSettings::clamp_size(500.0), 100.0);
        assert_eq!(BrushSettings::clamp_size(f32::NAN), 15.0);
    }
}
