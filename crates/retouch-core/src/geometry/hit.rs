use kurbo::Point;

use crate::geometry::crop::CropRect;

/// Grab point on the crop rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    LeftTop,
    RightTop,
    LeftBottom,
    RightBottom,
    Center,
}

impl Handle {
    pub const CORNERS: [Handle; 4] = [
        Handle::LeftTop,
        Handle::RightTop,
        Handle::LeftBottom,
        Handle::RightBottom,
    ];

    pub fn is_corner(self) -> bool {
        self != Handle::Center
    }
}

/// Hit-test tolerances in canvas units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitSlop {
    pub handle_radius: f64,
    pub center_inset: f64,
}

impl Default for HitSlop {
    fn default() -> Self {
        Self {
            handle_radius: 12.0,
            center_inset: 5.0,
        }
    }
}

/// Find what `point` grabs.
///
/// `scale` is the canvas-to-display ratio; the corner radius grows with it so
/// handles stay the same size on screen. Corners win over the center zone.
pub fn hit_test(rect: CropRect, point: Point, slop: HitSlop, scale: f64) -> Option<Handle> {
    let rect = rect.normalized();
    let radius = slop.handle_radius * scale.max(f64::EPSILON);
    for handle in Handle::CORNERS {
        if rect.corner(handle).distance(point) <= radius {
            return Some(handle);
        }
    }

    let inset = slop.center_inset;
    let inside_x = point.x > rect.x + inset && point.x < rect.x + rect.width - inset;
    let inside_y = point.y > rect.y + inset && point.y < rect.y + rect.height - inset;
    (inside_x && inside_y).then_some(Handle::Center)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> CropRect {
        CropRect::new(20.0, 20.0, 100.0, 60.0)
    }

    #[test]
    fn corners_within_radius() {
        let slop = HitSlop::default();
        assert_eq!(
            hit_test(rect(), Point::new(28.0, 28.0), slop, 1.0),
            Some(Handle::LeftTop)
        );
        assert_eq!(
            hit_test(rect(), Point::new(120.0, 80.0), slop, 1.0),
            Some(Handle::RightBottom)
        );
        assert_eq!(
            hit_test(rect(), Point::new(130.0, 15.0), slop, 1.0),
            Some(Handle::RightTop)
        );
    }

    #[test]
    fn radius_scales() {
        let slop = HitSlop::default();
        let p = Point::new(20.0, 100.0);
        assert_eq!(hit_test(rect(), p, slop, 1.0), None);
        assert_eq!(hit_test(rect(), p, slop, 2.0), Some(Handle::LeftBottom));
    }

    #[test]
    fn center_zone_is_inset() {
        let slop = HitSlop::default();
        assert_eq!(
            hit_test(rect(), Point::new(70.0, 50.0), slop, 1.0),
            Some(Handle::Center)
        );
        // on the edge band, away from corners
        assert_eq!(hit_test(rect(), Point::new(70.0, 22.0), slop, 1.0), None);
        assert_eq!(hit_test(rect(), Point::new(300.0, 50.0), slop, 1.0), None);
    }

    #[test]
    fn negative_extent_is_normalized_first() {
        let flipped = CropRect::new(120.0, 80.0, -100.0, -60.0);
        let slop = HitSlop::default();
        assert_eq!(
            hit_test(flipped, Point::new(20.0, 20.0), slop, 1.0),
            Some(Handle::LeftTop)
        );
        assert_eq!(
            hit_test(flipped, Point::new(70.0, 50.0), slop, 1.0),
            Some(Handle::Center)
        );
    }
}
