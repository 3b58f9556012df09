use anyhow::Result;

use crate::color::{apply_brightness, apply_contrast, apply_saturation, read_rgb, write_rgb};
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::pipeline::modules::brightness::brightness_factor;
use crate::surface::Surface;

/// One-knob auto enhancement: a mild contrast, exposure and saturation
/// boost derived from a single 0..100 value.
pub struct Enhance;

/// Factors `(contrast, brightness, saturation)` for an enhance value.
pub fn enhance_factors(value: f32) -> (f32, f32, f32) {
    let v = value / 4.0;
    let contrast = 1.0 + v / 100.0;
    let brightness = brightness_factor(v / 100.0 * 30.0);
    let saturation = 1.0 + v / 100.0;
    (contrast, brightness, saturation)
}

impl ProcessingModule for Enhance {
    fn name(&self) -> &str {
        "enhance"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.enhance == 0.0 {
            return Ok(input);
        }

        let (contrast, brightness, saturation) = enhance_factors(params.enhance);
        for pixel in input.data.chunks_exact_mut(4) {
            let rgb = apply_contrast(read_rgb(pixel), contrast);
            let rgb = apply_brightness(rgb, brightness);
            let rgb = apply_saturation(rgb, saturation);
            write_rgb(pixel, rgb);
        }
        Ok(input)
    }
}
