use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::geometry::hit::Handle;

/// Constraint on how the crop rectangle may be resized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectMode {
    Free,
    /// Whole content; not resizable by corner.
    Original,
    Fixed { x: u32, y: u32 },
}

/// Ratio choices offered in the crop panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropRatio {
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "3:2")]
    R3x2,
    #[serde(rename = "2:3")]
    R2x3,
    #[serde(rename = "4:3")]
    R4x3,
    #[serde(rename = "3:4")]
    R3x4,
    #[serde(rename = "5:4")]
    R5x4,
    #[serde(rename = "4:5")]
    R4x5,
    #[serde(rename = "7:5")]
    R7x5,
    #[serde(rename = "5:7")]
    R5x7,
    #[serde(rename = "16:9")]
    R16x9,
    #[serde(rename = "9:16")]
    R9x16,
}

impl CropRatio {
    pub const ALL: [CropRatio; 13] = [
        CropRatio::Free,
        CropRatio::Original,
        CropRatio::Square,
        CropRatio::R3x2,
        CropRatio::R2x3,
        CropRatio::R4x3,
        CropRatio::R3x4,
        CropRatio::R5x4,
        CropRatio::R4x5,
        CropRatio::R7x5,
        CropRatio::R5x7,
        CropRatio::R16x9,
        CropRatio::R9x16,
    ];

    pub fn aspect_mode(self) -> AspectMode {
        let fixed = |x, y| AspectMode::Fixed { x, y };
        match self {
            CropRatio::Free => AspectMode::Free,
            CropRatio::Original => AspectMode::Original,
            CropRatio::Square => fixed(1, 1),
            CropRatio::R3x2 => fixed(3, 2),
            CropRatio::R2x3 => fixed(2, 3),
            CropRatio::R4x3 => fixed(4, 3),
            CropRatio::R3x4 => fixed(3, 4),
            CropRatio::R5x4 => fixed(5, 4),
            CropRatio::R4x5 => fixed(4, 5),
            CropRatio::R7x5 => fixed(7, 5),
            CropRatio::R5x7 => fixed(5, 7),
            CropRatio::R16x9 => fixed(16, 9),
            CropRatio::R9x16 => fixed(9, 16),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CropRatio::Free => "Free",
            CropRatio::Original => "Original",
            CropRatio::Square => "Square",
            CropRatio::R3x2 => "3:2",
            CropRatio::R2x3 => "2:3",
            CropRatio::R4x3 => "4:3",
            CropRatio::R3x4 => "3:4",
            CropRatio::R5x4 => "5:4",
            CropRatio::R4x5 => "4:5",
            CropRatio::R7x5 => "7:5",
            CropRatio::R5x7 => "5:7",
            CropRatio::R16x9 => "16:9",
            CropRatio::R9x16 => "9:16",
        }
    }
}

impl Default for CropRatio {
    fn default() -> Self {
        CropRatio::Free
    }
}

/// Crop rectangle in content space.
///
/// While a corner is being dragged past the opposite corner, `width` or
/// `height` goes negative. Call [`CropRect::normalized`] before rendering
/// or hit-testing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(bounds: Size) -> Self {
        Self::new(0.0, 0.0, bounds.width, bounds.height)
    }

    /// Same region with non-negative extent.
    pub fn normalized(self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }

    pub fn to_kurbo(self) -> Rect {
        let n = self.normalized();
        Rect::new(n.x, n.y, n.x + n.width, n.y + n.height)
    }

    pub fn corner(self, handle: Handle) -> Point {
        let n = self.normalized();
        match handle {
            Handle::LeftTop => Point::new(n.x, n.y),
            Handle::RightTop => Point::new(n.x + n.width, n.y),
            Handle::LeftBottom => Point::new(n.x, n.y + n.height),
            Handle::RightBottom => Point::new(n.x + n.width, n.y + n.height),
            Handle::Center => n.to_kurbo().center(),
        }
    }

    /// Normalize, then pull the far edges back inside `bounds`.
    pub fn clamped(self, bounds: Size) -> Self {
        let n = self.normalized();
        let x = n.x.clamp(0.0, bounds.width);
        let y = n.y.clamp(0.0, bounds.height);
        let width = n.width.min(bounds.width - x).max(0.0);
        let height = n.height.min(bounds.height - y).max(0.0);
        Self::new(x, y, width, height)
    }

    /// Integer pixel window `(x, y, width, height)` covered by the rect.
    pub fn pixel_bounds(self) -> (i64, i64, u32, u32) {
        let n = self.normalized();
        let x = n.x.round() as i64;
        let y = n.y.round() as i64;
        let width = (n.x + n.width).round() as i64 - x;
        let height = (n.y + n.height).round() as i64 - y;
        (x, y, width.max(1) as u32, height.max(1) as u32)
    }
}

/// Largest rect of ratio `x:y` centered in `bounds`.
pub fn fit_ratio(bounds: Size, x: u32, y: u32) -> CropRect {
    let ratio = x as f64 / y as f64;
    let (width, height) = if bounds.width / bounds.height > ratio {
        ((bounds.height * ratio).floor(), bounds.height)
    } else {
        (bounds.width, (bounds.width / ratio).floor())
    };
    CropRect::new(
        ((bounds.width - width) / 2.0).floor(),
        ((bounds.height - height) / 2.0).floor(),
        width,
        height,
    )
}

/// Shrink one side of `(width, height)` so that `width / height == x / y`.
///
/// Signs are kept; only magnitudes are compared.
pub fn lock_ratio(width: f64, height: f64, x: u32, y: u32) -> (f64, f64) {
    let (rx, ry) = (x as f64, y as f64);
    let (w, h) = (width.abs(), height.abs());
    if h == 0.0 {
        return (0.0_f64.copysign(width), height);
    }
    if rx / ry <= w / h {
        let w = (rx / ry * h).floor();
        (w.copysign(width), height)
    } else {
        let h = (ry / rx * w).floor();
        (width, h.copysign(height))
    }
}

/// Pointer drag in progress on the crop rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropDrag {
    pub handle: Handle,
    pub start: Point,
    /// Normalized rect when the drag began.
    pub origin: CropRect,
}

/// Something the presentation layer should react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CropNotice {
    /// An Original-ratio corner drag switched the mode to Free.
    AspectModeReset,
}

impl CropDrag {
    pub fn new(handle: Handle, start: Point, rect: CropRect) -> Self {
        Self {
            handle,
            start,
            origin: rect.normalized(),
        }
    }

    /// Rect after moving the pointer to `point` (content space).
    ///
    /// The pointer is clamped to `bounds` first, so a corner never passes the
    /// far edge and the ratio lock only ever shrinks towards the anchor.
    pub fn apply(&self, point: Point, bounds: Size, aspect: AspectMode) -> CropRect {
        let o = self.origin;
        if self.handle == Handle::Center {
            let x = (o.x + point.x - self.start.x).clamp(0.0, (bounds.width - o.width).max(0.0));
            let y = (o.y + point.y - self.start.y).clamp(0.0, (bounds.height - o.height).max(0.0));
            return CropRect::new(x, y, o.width, o.height);
        }

        let p = Point::new(
            point.x.clamp(0.0, bounds.width),
            point.y.clamp(0.0, bounds.height),
        );
        let left = matches!(self.handle, Handle::LeftTop | Handle::LeftBottom);
        let top = matches!(self.handle, Handle::LeftTop | Handle::RightTop);
        // Opposite corner stays put.
        let ax = if left { o.x + o.width } else { o.x };
        let ay = if top { o.y + o.height } else { o.y };

        let (mut dx, mut dy) = (p.x - ax, p.y - ay);
        if let AspectMode::Fixed { x, y } = aspect {
            (dx, dy) = lock_ratio(dx, dy, x, y);
        }

        let (x, width) = if left { (ax + dx, -dx) } else { (ax, dx) };
        let (y, height) = if top { (ay + dy, -dy) } else { (ay, dy) };
        CropRect::new(x, y, width, height)
    }
}
