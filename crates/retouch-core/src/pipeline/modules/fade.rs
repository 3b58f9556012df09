use anyhow::Result;

use crate::color::{blend_towards, read_rgb, write_rgb};
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::surface::Surface;

/// Flat white wash over the whole frame.
pub struct Fade;

impl ProcessingModule for Fade {
    fn name(&self) -> &str {
        "fade"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.fade == 0.0 {
            return Ok(input);
        }

        let alpha = params.fade / 300.0;
        for pixel in input.data.chunks_exact_mut(4) {
            let rgb = blend_towards(read_rgb(pixel), 255.0, alpha);
            write_rgb(pixel, rgb);
        }
        Ok(input)
    }
}
