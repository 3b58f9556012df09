use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

use anyhow::Result;

use crate::color::{read_rgb, write_rgb};
use crate::params::EnhanceParams;
use crate::pipeline::module::ProcessingModule;
use crate::surface::Surface;

/// Monochrome film grain: uniform noise in `±value/5` added to every
/// channel of a pixel.
///
/// The default instance draws a fresh seed on every pass, so output is not
/// reproducible. Tests use [`Grain::seeded`].
#[derive(Default)]
pub struct Grain {
    seed: Option<u32>,
}

impl Grain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u32) -> Self {
        Self { seed: Some(seed) }
    }
}

pub fn fresh_seed() -> u32 {
    RandomState::new().hash_one(0x5EED_u64) as u32
}

#[inline]
fn hash_u32(mut x: u32) -> u32 {
    x = x.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

/// Hash of a pixel coordinate to [0, 1).
#[inline]
pub fn hash_unit(x: u32, y: u32, seed: u32) -> f32 {
    let h = hash_u32(
        x.wrapping_mul(374761393)
            .wrapping_add(y.wrapping_mul(668265263))
            .wrapping_add(seed),
    );
    (h & 0x00FFFFFF) as f32 / 16777216.0
}

impl ProcessingModule for Grain {
    fn name(&self) -> &str {
        "grain"
    }

    fn process_cpu(&self, mut input: Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.grain == 0.0 || input.is_empty() {
            return Ok(input);
        }

        let seed = self.seed.unwrap_or_else(fresh_seed);
        let amplitude = params.grain / 5.0;
        let width = input.width as usize;
        for (i, pixel) in input.data.chunks_exact_mut(4).enumerate() {
            let x = (i % width) as u32;
            let y = (i / width) as u32;
            let noise = (hash_unit(x, y, seed) * 2.0 - 1.0) * amplitude;
            let [r, g, b] = read_rgb(pixel);
            write_rgb(pixel, [r + noise, g + noise, b + noise]);
        }
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(grain: f32) -> EnhanceParams {
        EnhanceParams {
            grain,
            ..Default::default()
        }
    }

    #[test]
    fn identity_noop() {
        let buf = Surface::filled(4, 4, [128, 128, 128, 255]);
        let result = Grain::new().process_cpu(buf.clone(), &params(0.0)).unwrap();
        assert_eq!(result, buf);
    }

    #[test]
    fn noise_stays_within_amplitude() {
        let buf = Surface::filled(64, 64, [128, 128, 128, 255]);
        let result = Grain::new().process_cpu(buf, &params(100.0)).unwrap();
        for pixel in result.data.chunks_exact(4) {
            let delta = pixel[0] as i32 - 128;
            assert!(delta.abs() <= 20, "noise {delta} exceeds ±20");
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
        }
    }

    #[test]
    fn noise_is_statistically_centered() {
        let buf = Surface::filled(128, 128, [128, 128, 128, 255]);
        let result = Grain::new().process_cpu(buf, &params(100.0)).unwrap();
        let n = result.pixel_count() as f64;
        let deltas: Vec<f64> = result
            .data
            .chunks_exact(4)
            .map(|p| p[0] as f64 - 128.0)
            .collect();
        let mean = deltas.iter().sum::<f64>() / n;
        let variance = deltas.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
        // uniform on [-20, 20] has variance 400/3
        assert!(mean.abs() < 1.0, "mean shift {mean}");
        assert!((variance - 400.0 / 3.0).abs() < 15.0, "variance {variance}");
    }

    #[test]
    fn seeded_is_reproducible() {
        let buf = Surface::filled(16, 16, [100, 100, 100, 255]);
        let a = Grain::seeded(7).process_cpu(buf.clone(), &params(50.0)).unwrap();
        let b = Grain::seeded(7).process_cpu(buf.clone(), &params(50.0)).unwrap();
        let c = Grain::seeded(8).process_cpu(buf, &params(50.0)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hash_unit_range() {
        for x in 0..100 {
            let v = hash_unit(x, x * 3, 11);
            assert!((0.0..1.0).contains(&v));
        }
    }
}
