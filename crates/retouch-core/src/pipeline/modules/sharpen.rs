use anyhow::Result;

use crate::color::to_channel;
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::surface::Surface;

/// 3x3 unsharp kernel `[[0,-1,0],[-1,5,-1],[0,-1,0]]` blended with the
/// original by `value / 50`. Border pixels keep their original value.
pub struct Sharpen;

impl ProcessingModule for Sharpen {
    fn name(&self) -> &str {
        "sharpen"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.sharpen == 0.0 || input.width < 3 || input.height < 3 {
            return Ok(input);
        }

        let mix = params.sharpen / 50.0;
        let src = input.data.clone();
        let stride = input.width as usize * 4;
        for y in 1..(input.height as usize - 1) {
            for x in 1..(input.width as usize - 1) {
                let i = y * stride + x * 4;
                for c in 0..3 {
                    let center = src[i + c] as f32;
                    let kernel = 5.0 * center
                        - src[i + c - 4] as f32
                        - src[i + c + 4] as f32
                        - src[i + c - stride] as f32
                        - src[i + c + stride] as f32;
                    input.data[i + c] = to_channel(kernel * mix + center * (1.0 - mix));
                }
            }
        }
        Ok(input)
    }
}
