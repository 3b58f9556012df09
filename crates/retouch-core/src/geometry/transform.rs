use std::f64::consts::FRAC_PI_2;

use kurbo::{Affine, Point, Size, Vec2};

use crate::surface::Surface;

/// Axis-aligned bounds of a `width`x`height` image rotated by `rotation`.
pub fn content_size(width: u32, height: u32, rotation: f64) -> Size {
    let (sin, cos) = rotation.sin_cos();
    let (w, h) = (width as f64, height as f64);
    Size::new(
        (w * cos.abs() + h * sin.abs()).round().max(1.0),
        (w * sin.abs() + h * cos.abs()).round().max(1.0),
    )
}

/// Source-to-content mapping: mirror horizontally, rotate about the image
/// center, then center the result in `content`.
pub fn content_affine(source: Size, content: Size, rotation: f64, mirror: f64) -> Affine {
    Affine::translate(Vec2::new(content.width / 2.0, content.height / 2.0))
        * Affine::rotate(rotation)
        * Affine::scale_non_uniform(mirror, 1.0)
        * Affine::translate(Vec2::new(-source.width / 2.0, -source.height / 2.0))
}

/// Map a content-space point back into source pixels, or `None` while the
/// mirror is edge-on.
pub fn content_to_source(
    point: Point,
    source: Size,
    content: Size,
    rotation: f64,
    mirror: f64,
) -> Option<Point> {
    let forward = content_affine(source, content, rotation, mirror);
    if forward.determinant().abs() < 1e-9 {
        return None;
    }
    Some(forward.inverse() * point)
}

fn is_quarter_turn(rotation: f64) -> bool {
    let turns = rotation / FRAC_PI_2;
    (turns - turns.round()).abs() < 1e-9
}

/// Render `src` rotated and mirrored into a surface of its rotated bounds.
///
/// Quarter turns with a full mirror resample nearest-neighbour so the result
/// is an exact pixel permutation; anything else is bilinear on premultiplied
/// color. Pixels with no source coverage are transparent.
pub fn render_transformed(src: &Surface, rotation: f64, mirror: f64) -> Surface {
    if rotation == 0.0 && mirror == 1.0 {
        return src.clone();
    }
    let size = content_size(src.width, src.height, rotation);
    let mut out = Surface::new(size.width as u32, size.height as u32);
    let source = Size::new(src.width as f64, src.height as f64);
    let forward = content_affine(source, size, rotation, mirror);
    if forward.determinant().abs() < 1e-6 {
        return out;
    }
    let inverse = forward.inverse();
    let exact = is_quarter_turn(rotation) && (mirror.abs() - 1.0).abs() < 1e-9;

    for y in 0..out.height {
        for x in 0..out.width {
            let p = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let rgba = if exact {
                src.pixel(p.x.floor() as i64, p.y.floor() as i64)
            } else {
                sample_bilinear(src, p.x - 0.5, p.y - 0.5)
            };
            if rgba[3] != 0 {
                out.set_pixel(x, y, rgba);
            }
        }
    }
    out
}

fn sample_bilinear(src: &Surface, x: f64, y: f64) -> [u8; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];
    let mut acc = [0.0f64; 4];
    for (tx, ty, w) in taps {
        let p = src.pixel(tx, ty);
        let a = p[3] as f64 * w;
        acc[0] += p[0] as f64 * a;
        acc[1] += p[1] as f64 * a;
        acc[2] += p[2] as f64 * a;
        acc[3] += a;
    }
    if acc[3] <= 0.0 {
        return [0; 4];
    }
    let unpremul = |c: f64| (c / acc[3]).round().clamp(0.0, 255.0) as u8;
    [
        unpremul(acc[0]),
        unpremul(acc[1]),
        unpremul(acc[2]),
        acc[3].round().clamp(0.0, 255.0) as u8,
    ]
}
