use anyhow::Result;

use crate::color::{read_rgb, write_rgb};
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::surface::Surface;

/// Shifts red against blue.
pub struct Warmth;

impl ProcessingModule for Warmth {
    fn name(&self) -> &str {
        "warmth"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.warmth == 0.0 {
            return Ok(input);
        }

        let shift = -params.warmth / 5.0;
        for pixel in input.data.chunks_exact_mut(4) {
            let [r, g, b] = read_rgb(pixel);
            write_rgb(pixel, [r - shift, g, b + shift]);
        }
        Ok(input)
    }
}
