pub mod animation;
pub mod crop;
pub mod hit;
pub mod overlay;
pub mod transform;

use anyhow::Result;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::surface::Surface;
use animation::{QUARTER_TURN, RotationDial, Step, TransformAnimation};
use crop::{AspectMode, CropDrag, CropNotice, CropRatio, CropRect, fit_ratio};
use hit::{HitSlop, hit_test};

/// Tunables of the geometry stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Margin around the content while crop mode is on.
    pub padding: f64,
    pub handle_radius: f64,
    pub center_inset: f64,
    pub dial_ticks: u32,
    pub rotation_epsilon: f64,
    pub mirror_epsilon: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            padding: 16.0,
            handle_radius: 12.0,
            center_inset: 5.0,
            dial_ticks: 84,
            rotation_epsilon: 0.005,
            mirror_epsilon: 0.01,
        }
    }
}

impl GeometryConfig {
    pub const MAX_PADDING: f64 = 256.0;
    /// Smallest snap distance; below it a buffer may never drain.
    pub const MIN_EPSILON: f64 = 1e-6;

    /// Replace values the engine cannot work with. Padding becomes a whole
    /// pixel count in `0..=MAX_PADDING`; non-finite values fall back to the
    /// defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        let epsilon = |v: f64, fallback: f64| {
            if v.is_finite() {
                v.max(Self::MIN_EPSILON)
            } else {
                fallback
            }
        };
        Self {
            padding: finite_or(self.padding, defaults.padding)
                .round()
                .clamp(0.0, Self::MAX_PADDING),
            handle_radius: finite_or(self.handle_radius, defaults.handle_radius).max(0.0),
            center_inset: finite_or(self.center_inset, defaults.center_inset).max(0.0),
            dial_ticks: self.dial_ticks.max(1),
            rotation_epsilon: epsilon(self.rotation_epsilon, defaults.rotation_epsilon),
            mirror_epsilon: epsilon(self.mirror_epsilon, defaults.mirror_epsilon),
        }
    }

    fn slop(&self) -> HitSlop {
        HitSlop {
            handle_radius: self.handle_radius,
            center_inset: self.center_inset,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CropMode {
    #[default]
    Disabled,
    Enabled,
}

/// Crop, rotation and mirror state plus its rendering.
///
/// Coordinates:
/// - *source*: pixels of the merged color + layers surface
/// - *content*: the source after rotation and mirror, sized to its rotated
///   bounds; the crop rect lives here
/// - *canvas*: content shifted by `padding` on each side, shown while crop
///   mode is on
#[derive(Clone, Debug)]
pub struct GeometryEngine {
    config: GeometryConfig,
    source: Size,
    mode: CropMode,
    rect: CropRect,
    ratio: CropRatio,
    aspect: AspectMode,
    rotation: TransformAnimation,
    mirror: TransformAnimation,
    dial: RotationDial,
    drag: Option<CropDrag>,
    /// Bounds the rect was last fitted against.
    fitted: Size,
    notices: Vec<CropNotice>,
}

impl GeometryEngine {
    pub fn new(width: u32, height: u32, config: GeometryConfig) -> Self {
        let config = config.sanitized();
        let source = Size::new(width as f64, height as f64);
        Self {
            config,
            source,
            mode: CropMode::Disabled,
            rect: CropRect::full(source),
            ratio: CropRatio::Free,
            aspect: AspectMode::Free,
            rotation: TransformAnimation::new(0.0, config.rotation_epsilon),
            mirror: TransformAnimation::new(1.0, config.mirror_epsilon),
            dial: RotationDial::new(config.dial_ticks),
            drag: None,
            fitted: source,
            notices: Vec::new(),
        }
    }

    // ── State ────────────────────────────────────────────────────────────

    pub fn mode(&self) -> CropMode {
        self.mode
    }

    pub fn rect(&self) -> CropRect {
        self.rect
    }

    pub fn ratio(&self) -> CropRatio {
        self.ratio
    }

    pub fn aspect(&self) -> AspectMode {
        self.aspect
    }

    /// Rotation as currently displayed, including any animated part.
    pub fn rotation(&self) -> f64 {
        self.rotation.value()
    }

    pub fn committed_rotation(&self) -> f64 {
        self.rotation.committed()
    }

    pub fn mirror(&self) -> f64 {
        self.mirror.value()
    }

    pub fn committed_mirror(&self) -> f64 {
        self.mirror.committed()
    }

    pub fn dial_tick(&self) -> i32 {
        self.dial.tick()
    }

    pub fn source_size(&self) -> Size {
        self.source
    }

    pub fn padding(&self) -> f64 {
        self.config.padding
    }

    /// Rotated bounds of the source at the displayed rotation.
    pub fn bounds(&self) -> Size {
        transform::content_size(
            self.source.width as u32,
            self.source.height as u32,
            self.rotation.value(),
        )
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.rotation.in_progress() || self.mirror.in_progress()
    }

    pub fn take_notices(&mut self) -> Vec<CropNotice> {
        std::mem::take(&mut self.notices)
    }

    // ── Crop mode ────────────────────────────────────────────────────────

    pub fn enable_crop_mode(&mut self) {
        if self.mode == CropMode::Enabled {
            return;
        }
        debug!("crop mode enabled");
        self.mode = CropMode::Enabled;
    }

    /// Leave crop mode; the normalized rect becomes the output frame.
    pub fn disable_crop_mode(&mut self) {
        if self.mode == CropMode::Disabled {
            return;
        }
        debug!(rect = ?self.rect, "crop mode disabled");
        self.drag = None;
        self.rect = self.rect.clamped(self.bounds());
        self.mode = CropMode::Disabled;
    }

    /// Place the crop rect directly (content space). Switches to free ratio.
    pub fn set_crop_rect(&mut self, rect: CropRect) {
        self.ratio = CropRatio::Free;
        self.aspect = AspectMode::Free;
        self.rect = rect.clamped(self.bounds());
    }

    pub fn set_crop_ratio(&mut self, ratio: CropRatio) {
        self.ratio = ratio;
        self.aspect = ratio.aspect_mode();
        let bounds = self.bounds();
        self.rect = match self.aspect {
            AspectMode::Original => CropRect::full(bounds),
            AspectMode::Fixed { x, y } => fit_ratio(bounds, x, y),
            AspectMode::Free => self.rect.clamped(bounds),
        };
        self.fitted = bounds;
    }

    /// Free ratio and a rect covering the whole content.
    pub fn reset_crop(&mut self) {
        self.ratio = CropRatio::Free;
        self.aspect = AspectMode::Free;
        let bounds = self.bounds();
        self.rect = CropRect::full(bounds);
        self.fitted = bounds;
    }

    // ── Pointer ──────────────────────────────────────────────────────────

    /// Start a drag at `point` in canvas coordinates. `scale` is the
    /// canvas-to-display ratio. Returns `true` when a handle was grabbed.
    pub fn pointer_down(&mut self, point: Point, scale: f64) -> bool {
        if self.mode != CropMode::Enabled {
            return false;
        }
        let p = self.canvas_to_content(point);
        let Some(handle) = hit_test(self.rect, p, self.config.slop(), scale) else {
            return false;
        };
        if handle.is_corner() && self.aspect == AspectMode::Original {
            self.ratio = CropRatio::Free;
            self.aspect = AspectMode::Free;
            self.notices.push(CropNotice::AspectModeReset);
        }
        self.drag = Some(CropDrag::new(handle, p, self.rect));
        true
    }

    pub fn pointer_move(&mut self, point: Point) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let p = self.canvas_to_content(point);
        self.rect = drag.apply(p, self.bounds(), self.aspect);
        true
    }

    pub fn pointer_up(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.rect = self.rect.clamped(self.bounds());
        true
    }

    pub fn canvas_to_content(&self, point: Point) -> Point {
        Point::new(point.x - self.config.padding, point.y - self.config.padding)
    }

    /// Map a point on the rendered output back to source pixels.
    pub fn output_to_source(&self, point: Point) -> Option<Point> {
        let content = match self.mode {
            CropMode::Enabled => self.canvas_to_content(point),
            CropMode::Disabled => {
                let (x, y, _, _) = self.rect.clamped(self.bounds()).pixel_bounds();
                Point::new(point.x + x as f64, point.y + y as f64)
            }
        };
        transform::content_to_source(
            content,
            self.source,
            self.bounds(),
            self.rotation.value(),
            self.mirror.value(),
        )
    }

    // ── Rotation and mirror ──────────────────────────────────────────────

    /// Queue a clockwise quarter turn. Returns `true` when a new animation
    /// loop has to be started.
    pub fn rotate_quarter(&mut self) -> bool {
        self.rotation.push(QUARTER_TURN)
    }

    pub fn set_dial_tick(&mut self, tick: i32) -> bool {
        let delta = self.dial.set_tick(tick);
        if delta == 0.0 {
            return false;
        }
        self.rotation.push(delta)
    }

    /// Queue a horizontal flip.
    pub fn flip(&mut self) -> bool {
        let delta = -2.0 * self.mirror.committed();
        self.mirror.push(delta)
    }

    /// Advance both transform animations by `elapsed_ms`.
    pub fn advance(&mut self, elapsed_ms: f64, frame_ms: f64) -> Step {
        let rotation = self.rotation.step(elapsed_ms, frame_ms);
        let mirror = self.mirror.step(elapsed_ms, frame_ms);
        if rotation == Step::Running || mirror == Step::Running {
            return Step::Running;
        }
        if rotation == Step::Finished || mirror == Step::Finished {
            self.refit();
            return Step::Finished;
        }
        Step::Idle
    }

    /// Finish any animation at once.
    pub fn settle(&mut self) {
        if !self.is_animating() {
            return;
        }
        self.rotation.settle();
        self.mirror.settle();
        self.refit();
    }

    fn refit(&mut self) {
        let bounds = self.bounds();
        let was_full = self.rect.normalized() == CropRect::full(self.fitted);
        self.rect = match self.aspect {
            AspectMode::Original => CropRect::full(bounds),
            AspectMode::Fixed { x, y } => fit_ratio(bounds, x, y),
            AspectMode::Free if was_full => CropRect::full(bounds),
            AspectMode::Free => self.rect.clamped(bounds),
        };
        self.fitted = bounds;
        debug!(rotation = self.rotation.value(), mirror = self.mirror.value(), "geometry refit");
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Place the merged surface: rotate and mirror it, then either bake the
    /// crop (disabled) or draw it on the padded canvas with the crop
    /// interface (enabled).
    pub fn render(&self, merged: &Surface, scale: f32) -> Result<Surface> {
        let content =
            transform::render_transformed(merged, self.rotation.value(), self.mirror.value());
        let bounds = Size::new(content.width as f64, content.height as f64);
        match self.mode {
            CropMode::Disabled => {
                let (x, y, w, h) = self.rect.clamped(bounds).pixel_bounds();
                if (x, y, w, h) == (0, 0, content.width, content.height) {
                    return Ok(content);
                }
                Ok(content.sub_region(x, y, w, h))
            }
            CropMode::Enabled => {
                let pad = self.config.padding as u32;
                let mut canvas =
                    Surface::new(content.width + 2 * pad, content.height + 2 * pad);
                canvas.copy_from(&content, pad as i64, pad as i64);
                let mut pixmap = canvas.to_pixmap()?;
                let r = self.rect.normalized();
                let on_canvas = CropRect::new(r.x + pad as f64, r.y + pad as f64, r.width, r.height);
                overlay::draw_crop_overlay(&mut pixmap, on_canvas, scale)?;
                Ok(Surface::from_pixmap(&pixmap))
            }
        }
    }
}
