use anyhow::Result;

use crate::color::{blend_towards, read_rgb, write_rgb};
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::surface::Surface;

/// Radial darkening towards the frame edges.
pub struct Vignette;

const INNER_RADIUS: f32 = 0.05;
const OUTER_RADIUS: f32 = 0.6;

/// Black overlay alpha at pixel `(x, y)`. Radii scale with the width;
/// beyond the outer radius the gradient holds its edge value.
pub fn vignette_alpha(x: u32, y: u32, width: u32, height: u32, value: f32) -> f32 {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    let d = (dx * dx + dy * dy).sqrt();
    let inner = INNER_RADIUS * width as f32;
    let outer = OUTER_RADIUS * width as f32;
    let t = ((d - inner) / (outer - inner)).clamp(0.0, 1.0);
    t * value / 150.0
}

impl ProcessingModule for Vignette {
    fn name(&self) -> &str {
        "vignette"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.vignette == 0.0 || input.is_empty() {
            return Ok(input);
        }

        let (width, height) = (input.width, input.height);
        for (i, pixel) in input.data.chunks_exact_mut(4).enumerate() {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            let alpha = vignette_alpha(x, y, width, height, params.vignette);
            if alpha > 0.0 {
                let rgb = blend_towards(read_rgb(pixel), 0.0, alpha);
                write_rgb(pixel, rgb);
            }
        }
        Ok(input)
    }
}
