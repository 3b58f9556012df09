use std::time::Instant;

use anyhow::Result;
use kurbo::Point;
use retouch_core::color::Rgba;
use retouch_core::geometry::animation::Step;
use retouch_core::geometry::crop::{CropNotice, CropRatio, CropRect};
use retouch_core::geometry::{CropMode, GeometryEngine};
use retouch_core::layers::{
    BrushLayer, BrushSettings, BrushStroke, BrushTool, Overlay, Placement, StrokePoint, merge,
};
use retouch_core::params::{EnhanceParams, Filter};
use retouch_core::pipeline::{ColorRenderer, Pipeline};
use retouch_core::surface::Surface;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::event::EditEvent;
use crate::history::ReplayTarget;
use crate::scheduler::RedrawScheduler;
use crate::source::SourceImage;
use crate::stages::{DirtySet, RenderStats, Stage};

/// Messages for the presentation layer, drained with
/// [`Editor::drain_notifications`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A corner drag in original-ratio mode switched the crop to free.
    AspectModeReset,
    HistoryChanged { can_undo: bool, can_redo: bool },
}

/// Pipeline controller for one editing session.
///
/// Owns every stage surface. Color is recomputed on scheduler ticks only;
/// compositing and geometry redraw synchronously when their inputs change.
pub struct Editor {
    config: EditorConfig,
    source: SourceImage,
    params: EnhanceParams,
    renderer: Box<dyn ColorRenderer>,
    color: Surface,
    brush: BrushLayer,
    brush_settings: BrushSettings,
    brush_enabled: bool,
    backdrop_stale: bool,
    overlays: Vec<Overlay>,
    merged: Surface,
    geometry: GeometryEngine,
    output: Surface,
    /// Canvas-to-display ratio reported with the last pointer-down.
    display_scale: f64,
    dirty: DirtySet,
    scheduler: RedrawScheduler,
    stats: RenderStats,
    notifications: Vec<Notification>,
    closed: bool,
}

impl Editor {
    /// Start a session on the CPU color path.
    pub fn load(source: SourceImage, config: EditorConfig) -> Result<Self> {
        Self::with_renderer(source, config, Box::new(Pipeline::new()))
    }

    pub fn with_renderer(
        source: SourceImage,
        config: EditorConfig,
        renderer: Box<dyn ColorRenderer>,
    ) -> Result<Self> {
        let config = EditorConfig {
            geometry: config.geometry.sanitized(),
            ..config
        };
        let (width, height) = (source.width(), source.height());
        let mut brush_settings = config.brush;
        brush_settings.size = BrushSettings::clamp_size(brush_settings.size);

        let mut editor = Self {
            brush: BrushLayer::new(width, height)?,
            color: source.surface().clone(),
            merged: source.surface().clone(),
            output: source.surface().clone(),
            geometry: GeometryEngine::new(width, height, config.geometry),
            params: EnhanceParams::default(),
            renderer,
            brush_settings,
            brush_enabled: false,
            backdrop_stale: true,
            overlays: Vec::new(),
            display_scale: 1.0,
            dirty: DirtySet::all(),
            scheduler: RedrawScheduler::new(config.redraw_interval()),
            stats: RenderStats::default(),
            notifications: Vec::new(),
            closed: false,
            config,
            source,
        };
        editor.redraw()?;
        editor.scheduler.start(Instant::now());
        info!(
            width,
            height,
            renderer = editor.renderer.name(),
            "editing session started"
        );
        Ok(editor)
    }

    // ── State ────────────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn params(&self) -> &EnhanceParams {
        &self.params
    }

    pub fn enhance_parameter(&self, filter: Filter) -> f32 {
        self.params.get(filter)
    }

    /// Surface currently presented: the geometry stage's output.
    pub fn output(&self) -> &Surface {
        &self.output
    }

    pub fn color_output(&self) -> &Surface {
        &self.color
    }

    pub fn merged(&self) -> &Surface {
        &self.merged
    }

    pub fn geometry(&self) -> &GeometryEngine {
        &self.geometry
    }

    pub fn renderer_name(&self) -> &str {
        self.renderer.name()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn is_dirty(&self, stage: Stage) -> bool {
        self.dirty.is_dirty(stage)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    // ── Redraw ───────────────────────────────────────────────────────────

    /// Scheduler hook. Runs one coalesced redraw when a tick is due and some
    /// stage is dirty. Returns `true` when a redraw happened.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        if !self.scheduler.poll(now) || !self.dirty.any() {
            return Ok(false);
        }
        self.redraw()?;
        Ok(true)
    }

    /// Bring every dirty stage up to date now.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty.any() {
            self.redraw()?;
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        for stage in Stage::ORDER {
            if !self.dirty.is_dirty(stage) {
                continue;
            }
            match stage {
                Stage::Color => self.render_color()?,
                Stage::Composite => {
                    self.merged = merge(&self.color, &self.brush.surface(), &self.overlays)?;
                }
                Stage::Geometry => {
                    self.output = self
                        .geometry
                        .render(&self.merged, self.display_scale as f32)?;
                }
            }
            self.dirty.clear(stage);
            self.stats.record(stage);
            debug!(?stage, "stage redrawn");
        }
        Ok(())
    }

    fn render_color(&mut self) -> Result<()> {
        let surface = match self.renderer.render(self.source.surface(), &self.params) {
            Ok(surface) => surface,
            Err(err) if self.renderer.is_accelerated() => {
                warn!(
                    renderer = self.renderer.name(),
                    error = %err,
                    "accelerated color render failed, switching to cpu"
                );
                self.renderer = Box::new(Pipeline::new());
                self.stats.fallbacks += 1;
                self.renderer.render(self.source.surface(), &self.params)?
            }
            Err(err) => return Err(err),
        };
        self.color = surface;
        self.backdrop_stale = true;
        Ok(())
    }

    // ── Color ────────────────────────────────────────────────────────────

    /// Store a slider value (clamped to its range) and leave the recompute
    /// to the next scheduler tick. Returns the stored value.
    pub fn set_enhance_parameter(&mut self, filter: Filter, value: f32) -> f32 {
        if !self.accepts_input("set_enhance_parameter") {
            return self.params.get(filter);
        }
        let stored = self.params.set(filter, value);
        if stored != value {
            warn!(%filter, value, stored, "enhance value clamped");
        }
        self.dirty.mark(Stage::Color);
        stored
    }

    // ── Crop ─────────────────────────────────────────────────────────────

    pub fn crop_mode(&self) -> CropMode {
        self.geometry.mode()
    }

    pub fn crop_rect(&self) -> CropRect {
        self.geometry.rect()
    }

    pub fn crop_ratio(&self) -> CropRatio {
        self.geometry.ratio()
    }

    pub fn set_crop_ratio(&mut self, ratio: CropRatio) -> Result<()> {
        if !self.accepts_input("set_crop_ratio") {
            return Ok(());
        }
        self.geometry.set_crop_ratio(ratio);
        self.mark_geometry()
    }

    /// Place the crop rect in content coordinates.
    pub fn set_crop_rect(&mut self, rect: CropRect) -> Result<()> {
        if !self.accepts_input("set_crop_rect") {
            return Ok(());
        }
        self.geometry.set_crop_rect(rect);
        self.mark_geometry()
    }

    /// Back to the state a session starts with: whole content, free ratio.
    pub fn reset_crop(&mut self) -> Result<()> {
        if !self.accepts_input("reset_crop") {
            return Ok(());
        }
        self.geometry.reset_crop();
        self.mark_geometry()
    }

    pub fn enable_crop_mode(&mut self) -> Result<()> {
        if !self.accepts_input("enable_crop_mode") {
            return Ok(());
        }
        if self.brush_enabled {
            self.disable_brush_mode()?;
        }
        self.geometry.enable_crop_mode();
        self.mark_geometry()
    }

    pub fn disable_crop_mode(&mut self) -> Result<()> {
        if !self.accepts_input("disable_crop_mode") {
            return Ok(());
        }
        self.geometry.disable_crop_mode();
        self.mark_geometry()
    }

    /// `false` once the session is closed; later input is ignored.
    fn accepts_input(&self, op: &'static str) -> bool {
        if self.closed {
            debug!(op, "session closed, input ignored");
        }
        !self.closed
    }

    fn mark_geometry(&mut self) -> Result<()> {
        self.dirty.mark(Stage::Geometry);
        self.flush()
    }

    fn mark_composite(&mut self) -> Result<()> {
        self.dirty.mark(Stage::Composite);
        self.flush()
    }

    fn collect_notices(&mut self) {
        for notice in self.geometry.take_notices() {
            match notice {
                CropNotice::AspectModeReset => self.notify(Notification::AspectModeReset),
            }
        }
    }

    // ── Pointer ──────────────────────────────────────────────────────────

    /// Pointer pressed at `point` on the presented surface. `scale` is the
    /// surface-to-display ratio. Returns `true` when the press started a
    /// crop drag or a stroke.
    pub fn pointer_down(&mut self, point: Point, scale: f64) -> Result<bool> {
        if !self.accepts_input("pointer_down") {
            return Ok(false);
        }
        if scale.is_finite() && scale > 0.0 {
            self.display_scale = scale;
        }
        if self.geometry.mode() == CropMode::Enabled {
            let grabbed = self.geometry.pointer_down(point, self.display_scale);
            self.collect_notices();
            if grabbed {
                self.mark_geometry()?;
            }
            return Ok(grabbed);
        }
        if !self.brush_enabled {
            return Ok(false);
        }
        let Some(at) = self.geometry.output_to_source(point) else {
            return Ok(false);
        };
        let settings = self.brush_settings;
        if settings.tool == BrushTool::Blur && (self.backdrop_stale || !self.brush.has_backdrop()) {
            self.brush.set_backdrop(&self.color)?;
            self.backdrop_stale = false;
        }
        self.brush.begin_stroke(
            StrokePoint::new(at.x as f32, at.y as f32, settings.size),
            settings.color,
            settings.tool,
        )?;
        self.mark_composite()?;
        Ok(true)
    }

    pub fn pointer_move(&mut self, point: Point) -> Result<bool> {
        if !self.accepts_input("pointer_move") {
            return Ok(false);
        }
        if self.geometry.is_dragging() {
            self.geometry.pointer_move(point);
            self.mark_geometry()?;
            return Ok(true);
        }
        if !self.brush.is_drawing() {
            return Ok(false);
        }
        let Some(at) = self.geometry.output_to_source(point) else {
            return Ok(false);
        };
        let size = self.brush_settings.size;
        self.brush
            .extend_stroke(StrokePoint::new(at.x as f32, at.y as f32, size));
        self.mark_composite()?;
        Ok(true)
    }

    pub fn pointer_up(&mut self) -> Result<bool> {
        if !self.accepts_input("pointer_up") {
            return Ok(false);
        }
        if self.geometry.pointer_up() {
            self.mark_geometry()?;
            return Ok(true);
        }
        if self.brush.end_stroke().is_some() {
            self.mark_composite()?;
            return Ok(true);
        }
        Ok(false)
    }

    // ── Brush ────────────────────────────────────────────────────────────

    pub fn is_brush_mode(&self) -> bool {
        self.brush_enabled
    }

    pub fn enable_brush_mode(&mut self) -> Result<()> {
        if !self.accepts_input("enable_brush_mode") {
            return Ok(());
        }
        if self.geometry.mode() == CropMode::Enabled {
            self.disable_crop_mode()?;
        }
        self.brush_enabled = true;
        Ok(())
    }

    pub fn disable_brush_mode(&mut self) -> Result<()> {
        self.brush_enabled = false;
        if self.brush.end_stroke().is_some() {
            self.mark_composite()?;
        }
        Ok(())
    }

    pub fn brush_settings(&self) -> BrushSettings {
        self.brush_settings
    }

    pub fn set_brush_color(&mut self, color: Rgba) {
        if !self.accepts_input("set_brush_color") {
            return;
        }
        self.brush_settings.color = color;
    }

    pub fn change_brush_tool(&mut self, tool: BrushTool) {
        if !self.accepts_input("change_brush_tool") {
            return;
        }
        self.brush_settings.tool = tool;
    }

    /// Returns the size actually stored.
    pub fn change_brush_size(&mut self, size: f32) -> f32 {
        if !self.accepts_input("change_brush_size") {
            return self.brush_settings.size;
        }
        let clamped = BrushSettings::clamp_size(size);
        if clamped != size {
            warn!(size, clamped, "brush size clamped");
        }
        self.brush_settings.size = clamped;
        clamped
    }

    pub fn strokes(&self) -> &[BrushStroke] {
        self.brush.strokes()
    }

    /// Remove the most recent finished stroke.
    pub fn remove_last_stroke(&mut self) -> Result<Option<BrushStroke>> {
        if !self.accepts_input("remove_last_stroke") {
            return Ok(None);
        }
        let popped = self.brush.pop_stroke()?;
        if popped.is_some() {
            self.mark_composite()?;
        }
        Ok(popped)
    }

    pub fn clear_strokes(&mut self) -> Result<()> {
        if !self.accepts_input("clear_strokes") {
            return Ok(());
        }
        self.brush.clear();
        self.mark_composite()
    }

    // ── Overlays ─────────────────────────────────────────────────────────

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Add a sticker or text surface above the brush layer. An existing
    /// overlay with the same id is replaced in place.
    pub fn add_overlay(
        &mut self,
        id: impl Into<String>,
        placement: Placement,
        surface: Surface,
    ) -> Result<()> {
        if !self.accepts_input("add_overlay") {
            return Ok(());
        }
        let overlay = Overlay {
            id: id.into(),
            placement,
            surface,
        };
        match self.overlays.iter_mut().find(|o| o.id == overlay.id) {
            Some(existing) => *existing = overlay,
            None => self.overlays.push(overlay),
        }
        self.mark_composite()
    }

    pub fn remove_overlay(&mut self, id: &str) -> Result<bool> {
        if !self.accepts_input("remove_overlay") {
            return Ok(false);
        }
        let before = self.overlays.len();
        self.overlays.retain(|o| o.id != id);
        if self.overlays.len() == before {
            return Ok(false);
        }
        self.mark_composite()?;
        Ok(true)
    }

    // ── Rotation and mirror ──────────────────────────────────────────────

    /// Returns `true` when the caller has to start driving
    /// [`Editor::advance_animation`].
    pub fn rotate_quarter(&mut self) -> bool {
        self.accepts_input("rotate_quarter") && self.geometry.rotate_quarter()
    }

    pub fn set_dial_tick(&mut self, tick: i32) -> bool {
        self.accepts_input("set_dial_tick") && self.geometry.set_dial_tick(tick)
    }

    pub fn mirror(&mut self) -> bool {
        self.accepts_input("mirror") && self.geometry.flip()
    }

    pub fn is_animating(&self) -> bool {
        self.geometry.is_animating()
    }

    /// Animation frame hook.
    pub fn advance_animation(&mut self, elapsed_ms: f64) -> Result<Step> {
        if !self.accepts_input("advance_animation") {
            return Ok(Step::Idle);
        }
        let step = self.geometry.advance(elapsed_ms, self.config.frame_ms());
        if step != Step::Idle {
            self.mark_geometry()?;
        }
        Ok(step)
    }

    /// Jump any running animation to its end.
    pub fn settle_animation(&mut self) -> Result<()> {
        if self.accepts_input("settle_animation") && self.geometry.is_animating() {
            self.geometry.settle();
            self.mark_geometry()?;
        }
        Ok(())
    }

    // ── Export and teardown ──────────────────────────────────────────────

    /// Final frame with the crop baked in. The live session keeps its crop
    /// mode and any running animation.
    pub fn get_modified_file(&mut self) -> Result<Surface> {
        self.flush()?;
        let mut geometry = self.geometry.clone();
        geometry.settle();
        geometry.disable_crop_mode();
        let out = geometry.render(&self.merged, 1.0)?;
        info!(width = out.width, height = out.height, "modified file rendered");
        Ok(out)
    }

    /// Stop the redraw timer and drop any in-flight gesture.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.scheduler.stop();
        self.geometry.pointer_up();
        self.brush.end_stroke();
        self.brush_enabled = false;
        self.closed = true;
        info!(stats = ?self.stats, "editing session closed");
    }
}

impl ReplayTarget for Editor {
    fn replay(&mut self, event: &EditEvent) -> Result<()> {
        match *event {
            EditEvent::Enhance { filter, value } => {
                self.set_enhance_parameter(filter, value);
                Ok(())
            }
            EditEvent::Crop { ratio } => self.set_crop_ratio(ratio),
            EditEvent::CropReset => self.reset_crop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_core::geometry::GeometryConfig;
    use std::time::Duration;

    fn gradient(width: u32, height: u32) -> SourceImage {
        let mut s = Surface::new(width, height);
        for y in 0..height {
            for x in 0..width {
                s.set_pixel(x, y, [(x * 2) as u8, (y * 2) as u8, 90, 255]);
            }
        }
        SourceImage::from_surface(s).unwrap()
    }

    fn editor(width: u32, height: u32) -> Editor {
        Editor::load(gradient(width, height), EditorConfig::default()).unwrap()
    }

    struct Failing;

    impl ColorRenderer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn render(&mut self, _: &Surface, _: &EnhanceParams) -> Result<Surface> {
            anyhow::bail!("device lost")
        }

        fn is_accelerated(&self) -> bool {
            true
        }
    }

    #[test]
    fn load_renders_every_stage_once() {
        let e = editor(20, 10);
        let stats = e.stats();
        assert_eq!((stats.color_runs, stats.composite_runs, stats.geometry_runs), (1, 1, 1));
        assert_eq!(e.output(), e.source().surface());
        for stage in Stage::ORDER {
            assert!(!e.is_dirty(stage));
        }
    }

    #[test]
    fn enhance_is_deferred_and_coalesced() {
        let mut e = editor(20, 10);
        let t0 = Instant::now();
        for v in [5.0, 10.0, 15.0, 20.0] {
            e.set_enhance_parameter(Filter::Brightness, v);
        }
        assert!(e.is_dirty(Stage::Color));
        assert_eq!(e.stats().color_runs, 1);

        let tick = t0 + Duration::from_millis(1000);
        assert!(e.tick(tick).unwrap());
        assert_eq!(e.stats().color_runs, 2);
        assert!(!e.is_dirty(Stage::Color));
        assert!(!e.tick(tick + Duration::from_millis(500)).unwrap());
    }

    #[test]
    fn out_of_range_value_is_clamped() {
        let mut e = editor(4, 4);
        assert_eq!(e.set_enhance_parameter(Filter::Fade, 500.0), 100.0);
        assert_eq!(e.set_enhance_parameter(Filter::Warmth, -500.0), -100.0);
    }

    #[test]
    fn geometry_changes_skip_color() {
        let mut e = editor(40, 30);
        e.enable_crop_mode().unwrap();
        e.set_crop_ratio(CropRatio::Square).unwrap();
        e.rotate_quarter();
        while e.advance_animation(16.0).unwrap() == Step::Running {}
        e.disable_crop_mode().unwrap();
        let stats = e.stats();
        assert_eq!(stats.color_runs, 1);
        assert_eq!(stats.composite_runs, 1);
        assert!(stats.geometry_runs > 4);
    }

    #[test]
    fn accelerated_failure_falls_back_to_cpu() {
        let e = Editor::with_renderer(gradient(8, 8), EditorConfig::default(), Box::new(Failing))
            .unwrap();
        assert_eq!(e.renderer_name(), "cpu");
        assert_eq!(e.stats().fallbacks, 1);
        assert_eq!(e.color_output(), e.source().surface());
    }

    #[test]
    fn brush_stroke_lands_in_merged() {
        let mut e = editor(60, 60);
        e.enable_brush_mode().unwrap();
        e.set_brush_color(Rgba::opaque(0, 0, 255));
        e.change_brush_size(10.0);
        assert!(e.pointer_down(Point::new(10.0, 30.0), 1.0).unwrap());
        assert!(e.pointer_move(Point::new(50.0, 30.0)).unwrap());
        assert!(e.pointer_up().unwrap());

        assert_eq!(e.strokes().len(), 1);
        assert_eq!(e.merged().pixel(30, 30), [0, 0, 255, 255]);
        assert_eq!(e.output().pixel(30, 30), [0, 0, 255, 255]);
        assert_eq!(e.stats().color_runs, 1);
    }

    #[test]
    fn crop_and_brush_modes_are_exclusive() {
        let mut e = editor(20, 20);
        e.enable_brush_mode().unwrap();
        e.enable_crop_mode().unwrap();
        assert!(!e.is_brush_mode());
        e.enable_brush_mode().unwrap();
        assert_eq!(e.crop_mode(), CropMode::Disabled);
    }

    #[test]
    fn original_corner_drag_notifies() {
        let mut e = editor(100, 80);
        e.enable_crop_mode().unwrap();
        e.set_crop_ratio(CropRatio::Original).unwrap();
        let pad = e.config().geometry.padding;
        assert!(e.pointer_down(Point::new(pad, pad), 1.0).unwrap());
        assert_eq!(e.drain_notifications(), vec![Notification::AspectModeReset]);
        assert_eq!(e.crop_ratio(), CropRatio::Free);
        e.pointer_up().unwrap();
        assert!(e.drain_notifications().is_empty());
    }

    #[test]
    fn overlays_replace_and_remove() {
        let mut e = editor(10, 10);
        let red = Surface::filled(2, 2, [255, 0, 0, 255]);
        e.add_overlay("sticker", Placement::default(), red).unwrap();
        e.add_overlay(
            "sticker",
            Placement {
                x: 5.0,
                y: 5.0,
                scale: 1.0,
            },
            Surface::filled(2, 2, [0, 255, 0, 255]),
        )
        .unwrap();
        assert_eq!(e.overlays().len(), 1);
        assert_eq!(e.output().pixel(5, 5), [0, 255, 0, 255]);
        assert!(e.remove_overlay("sticker").unwrap());
        assert!(!e.remove_overlay("sticker").unwrap());
        assert_eq!(e.output(), e.source().surface());
    }

    #[test]
    fn export_leaves_live_crop_mode_alone() {
        let mut e = editor(50, 40);
        e.enable_crop_mode().unwrap();
        e.set_crop_rect(CropRect::new(5.0, 5.0, 20.0, 10.0)).unwrap();
        let out = e.get_modified_file().unwrap();
        assert_eq!((out.width, out.height), (20, 10));
        assert_eq!(e.crop_mode(), CropMode::Enabled);
        let pad = e.config().geometry.padding as u32;
        assert_eq!(e.output().width, 50 + 2 * pad);
    }

    #[test]
    fn geometry_config_is_sanitized_on_load() {
        let config = EditorConfig {
            geometry: GeometryConfig {
                padding: -5.0,
                rotation_epsilon: f64::NAN,
                ..GeometryConfig::default()
            },
            ..EditorConfig::default()
        };
        let e = Editor::load(gradient(8, 8), config).unwrap();
        assert_eq!(e.config().geometry.padding, 0.0);
        assert_eq!(e.geometry().padding(), 0.0);
        assert_eq!(e.config().geometry.rotation_epsilon, 0.005);
    }

    #[test]
    fn closed_session_ignores_input() {
        let mut e = editor(40, 40);
        e.close();
        let before = e.stats();

        e.enable_brush_mode().unwrap();
        assert!(!e.is_brush_mode());
        assert!(!e.pointer_down(Point::new(5.0, 5.0), 1.0).unwrap());
        assert!(!e.pointer_move(Point::new(30.0, 30.0)).unwrap());
        assert!(!e.pointer_up().unwrap());
        assert!(e.strokes().is_empty());

        e.enable_crop_mode().unwrap();
        assert_eq!(e.crop_mode(), CropMode::Disabled);
        e.set_crop_rect(CropRect::new(1.0, 1.0, 5.0, 5.0)).unwrap();
        e.set_crop_ratio(CropRatio::Square).unwrap();
        assert_eq!(e.crop_rect(), CropRect::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(e.crop_ratio(), CropRatio::Free);

        assert!(!e.rotate_quarter());
        assert!(!e.mirror());
        assert!(!e.set_dial_tick(4));
        assert_eq!(e.advance_animation(16.0).unwrap(), Step::Idle);
        e.add_overlay("s", Placement::default(), Surface::filled(2, 2, [1, 2, 3, 255]))
            .unwrap();
        assert!(e.overlays().is_empty());
        assert_eq!(e.set_enhance_parameter(Filter::Fade, 40.0), 0.0);
        assert_eq!(e.change_brush_size(70.0), BrushSettings::default().size);

        assert_eq!(e.stats(), before);
        assert_eq!(e.output(), e.source().surface());
    }

    #[test]
    fn close_stops_ticks() {
        let mut e = editor(4, 4);
        e.set_enhance_parameter(Filter::Grain, 30.0);
        e.close();
        assert!(e.is_closed());
        assert!(!e.tick(Instant::now() + Duration::from_secs(5)).unwrap());
    }
}
