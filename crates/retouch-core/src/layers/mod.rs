pub mod brush;
pub mod compositor;

pub use brush::{BrushLayer, BrushSettings, BrushStroke, BrushTool, StrokePoint};
pub use compositor::{Overlay, Placement, merge, over};
