use anyhow::Result;

use crate::color::{read_rgb, write_rgb};
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::surface::Surface;

/// Luminance-weighted lift/pull of bright and dark regions.
pub struct HighlightsShadows;

/// Additive channel offset for a pixel of luminance `l`.
///
/// `l` is `0.00299 R + 0.00587 G + 0.00114 B`, i.e. 0..2.55 for 8-bit input.
pub fn tone_offset(l: f32, highlights: f32, shadows: f32) -> f32 {
    let h = highlights / 500.0 * (10f32.powf(l) - 1.0);
    let s = -shadows / 500.0 * 10.0 * (10f32.powf(1.2 - l) - 1.0);
    h + s
}

impl ProcessingModule for HighlightsShadows {
    fn name(&self) -> &str {
        "highlights_shadows"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.highlights == 0.0 && params.shadows == 0.0 {
            return Ok(input);
        }

        for pixel in input.data.chunks_exact_mut(4) {
            let [r, g, b] = read_rgb(pixel);
            let l = 0.00299 * r + 0.00587 * g + 0.00114 * b;
            let offset = tone_offset(l, params.highlights, params.shadows);
            write_rgb(pixel, [r + offset, g + offset, b + offset]);
        }
        Ok(input)
    }
}
