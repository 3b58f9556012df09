use anyhow::Result;

use crate::color::{apply_saturation, read_rgb, write_rgb};
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::surface::Surface;

pub struct Saturation;

/// Slider value to the matrix strength `sv`.
pub fn saturation_factor(value: f32) -> f32 {
    value / 100.0 + 1.0
}

impl ProcessingModule for Saturation {
    fn name(&self) -> &str {
        "saturation"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.saturation == 0.0 {
            return Ok(input);
        }

        let sv = saturation_factor(params.saturation);
        for pixel in input.data.chunks_exact_mut(4) {
            let rgb = apply_saturation(read_rgb(pixel), sv);
            write_rgb(pixel, rgb);
        }
        Ok(input)
    }
}
