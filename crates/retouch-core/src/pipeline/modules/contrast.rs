use anyhow::Result;

use crate::color::{apply_contrast, read_rgb, write_rgb};
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::surface::Surface;

pub struct Contrast;

/// Slider value (-100..100) to a contrast multiplier.
pub fn contrast_factor(value: f32) -> f32 {
    value / 100.0 + 1.0
}

impl ProcessingModule for Contrast {
    fn name(&self) -> &str {
        "contrast"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.contrast == 0.0 {
            return Ok(input);
        }

        let factor = contrast_factor(params.contrast);
        for pixel in input.data.chunks_exact_mut(4) {
            let rgb = apply_contrast(read_rgb(pixel), factor);
            write_rgb(pixel, rgb);
        }
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(contrast: f32) -> EnhanceParams {
        EnhanceParams {
            contrast,
            ..Default::default()
        }
    }

    #[test]
    fn identity_noop() {
        let buf = Surface::filled(2, 2, [10, 200, 90, 255]);
        let result = Contrast.process_cpu(buf.clone(), &params(0.0)).unwrap();
        assert_eq!(result, buf);
    }

    #[test]
    fn positive_spreads_from_mid_gray() {
        let buf = Surface::filled(1, 1, [100, 128, 160, 255]);
        let result = Contrast.process_cpu(buf, &params(50.0)).unwrap();
        // 1.5 * c - 64
        assert_eq!(result.data, vec![86, 128, 176, 255]);
    }

    #[test]
    fn minus_100_collapses_to_mid_gray() {
        let buf = Surface::filled(1, 1, [0, 77, 255, 255]);
        let result = Contrast.process_cpu(buf, &params(-100.0)).unwrap();
        assert_eq!(result.data, vec![128, 128, 128, 255]);
    }

    #[test]
    fn alpha_untouched() {
        let buf = Surface::filled(1, 1, [10, 20, 30, 42]);
        let result = Contrast.process_cpu(buf, &params(80.0)).unwrap();
        assert_eq!(result.data[3], 42);
    }
}
