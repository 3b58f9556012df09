use std::path::Path;

use anyhow::{Context, Result};
use kurbo::Point;
use retouch_core::color::Rgba;
use retouch_core::geometry::animation::Step;
use retouch_core::geometry::crop::{CropRatio, CropRect};
use retouch_core::layers::BrushTool;
use retouch_core::params::Filter;
use retouch_session::{EditEvent, Session};
use serde::Deserialize;
use tracing::debug;

/// One line of an edit script.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Enhance {
        filter: Filter,
        value: f32,
    },
    CropRatio {
        ratio: CropRatio,
    },
    /// Whole image, free ratio.
    CropReset,
    /// Content-space rectangle, applied through crop mode.
    CropRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Rotate {
        #[serde(default = "one")]
        turns: u32,
    },
    Dial {
        tick: i32,
    },
    Mirror,
    /// Polyline in output coordinates.
    Stroke {
        points: Vec<[f64; 2]>,
        #[serde(default)]
        tool: Option<BrushTool>,
        /// `#RRGGBB` or `rgb(r, g, b)`.
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        size: Option<f32>,
    },
    Undo,
    Redo,
}

fn one() -> u32 {
    1
}

pub fn load(path: &Path) -> Result<Vec<ScriptStep>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read script {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid script {}", path.display()))
}

pub fn parse(text: &str) -> Result<Vec<ScriptStep>> {
    Ok(serde_json::from_str(text)?)
}

/// Replay `steps` the way an interactive user would: live update, then
/// commit where the edit is undoable.
pub fn run(session: &mut Session, steps: &[ScriptStep]) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        debug!(index, ?step, "script step");
        apply(session, step).with_context(|| format!("script step {index} failed"))?;
    }
    session.editor_mut().flush()
}

fn apply(session: &mut Session, step: &ScriptStep) -> Result<()> {
    match step {
        ScriptStep::Enhance { filter, value } => session.apply(EditEvent::Enhance {
            filter: *filter,
            value: *value,
        }),
        ScriptStep::CropRatio { ratio } => session.apply(EditEvent::Crop { ratio: *ratio }),
        ScriptStep::CropReset => session.apply(EditEvent::CropReset),
        ScriptStep::CropRect {
            x,
            y,
            width,
            height,
        } => {
            let editor = session.editor_mut();
            editor.enable_crop_mode()?;
            editor.set_crop_rect(CropRect::new(*x, *y, *width, *height))?;
            editor.disable_crop_mode()
        }
        ScriptStep::Rotate { turns } => {
            for _ in 0..*turns {
                session.editor_mut().rotate_quarter();
            }
            animate(session)
        }
        ScriptStep::Dial { tick } => {
            session.editor_mut().set_dial_tick(*tick);
            animate(session)
        }
        ScriptStep::Mirror => {
            session.editor_mut().mirror();
            animate(session)
        }
        ScriptStep::Stroke {
            points,
            tool,
            color,
            size,
        } => {
            let editor = session.editor_mut();
            if let Some(tool) = tool {
                editor.change_brush_tool(*tool);
            }
            if let Some(color) = color {
                editor.set_brush_color(color.parse::<Rgba>()?);
            }
            if let Some(size) = size {
                editor.change_brush_size(*size);
            }
            let Some((first, rest)) = points.split_first() else {
                return Ok(());
            };
            editor.enable_brush_mode()?;
            editor.pointer_down(Point::new(first[0], first[1]), 1.0)?;
            for p in rest {
                editor.pointer_move(Point::new(p[0], p[1]))?;
            }
            editor.pointer_up()?;
            editor.disable_brush_mode()
        }
        ScriptStep::Undo => session.undo().map(|_| ()),
        ScriptStep::Redo => session.redo().map(|_| ()),
    }
}

/// Drive a transform animation to the end at the configured frame rate.
fn animate(session: &mut Session) -> Result<()> {
    let editor = session.editor_mut();
    let frame = editor.config().frame_ms();
    while editor.is_animating() {
        if editor.advance_animation(frame)? != Step::Running {
            break;
        }
    }
    editor.settle_animation()
}
