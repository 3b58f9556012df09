use anyhow::Result;

use crate::color::{apply_brightness, read_rgb, write_rgb};
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::surface::Surface;

pub struct Brightness;

/// Slider value to an exposure multiplier: `brightness(value + 100%)`.
pub fn brightness_factor(value: f32) -> f32 {
    (value + 100.0) / 100.0
}

impl ProcessingModule for Brightness {
    fn name(&self) -> &str {
        "brightness"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.brightness == 0.0 {
            return Ok(input);
        }

        let factor = brightness_factor(params.brightness);
        for pixel in input.data.chunks_exact_mut(4) {
            let rgb = apply_brightness(read_rgb(pixel), factor);
            write_rgb(pixel, rgb);
        }
        Ok(input)
    }
}
