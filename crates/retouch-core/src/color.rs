use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

// ── Channel math ─────────────────────────────────────────────────────────
//
// Every filter works on RGB triples in the 0..255 range. Intermediate
// results are clamped after each step so one filter never feeds an
// out-of-range value into the next.

/// Luminance weights of the saturation matrix.
pub const SAT_LUMA_R: f32 = 0.3086;
pub const SAT_LUMA_G: f32 = 0.6094;
pub const SAT_LUMA_B: f32 = 0.0820;

pub type Rgb = [f32; 3];

pub fn clamp_channel(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 255.0) }
}

pub fn to_channel(v: f32) -> u8 {
    clamp_channel(v).round() as u8
}

pub fn read_rgb(pixel: &[u8]) -> Rgb {
    [pixel[0] as f32, pixel[1] as f32, pixel[2] as f32]
}

pub fn write_rgb(pixel: &mut [u8], rgb: Rgb) {
    pixel[0] = to_channel(rgb[0]);
    pixel[1] = to_channel(rgb[1]);
    pixel[2] = to_channel(rgb[2]);
}

/// Linear contrast around mid-gray: `c * f + 128 * (1 - f)`.
pub fn apply_contrast(rgb: Rgb, factor: f32) -> Rgb {
    let intercept = 128.0 * (1.0 - factor);
    rgb.map(|c| clamp_channel(c * factor + intercept))
}

/// Multiplicative exposure.
pub fn apply_brightness(rgb: Rgb, factor: f32) -> Rgb {
    rgb.map(|c| clamp_channel(c * factor))
}

/// Luminance-preserving 3x3 saturation matrix; `sv == 1` is identity.
pub fn apply_saturation(rgb: Rgb, sv: f32) -> Rgb {
    let inv = 1.0 - sv;
    let r_w = inv * SAT_LUMA_R;
    let g_w = inv * SAT_LUMA_G;
    let b_w = inv * SAT_LUMA_B;
    let [r, g, b] = rgb;
    [
        clamp_channel((r_w + sv) * r + g_w * g + b_w * b),
        clamp_channel(r_w * r + (g_w + sv) * g + b_w * b),
        clamp_channel(r_w * r + g_w * g + (b_w + sv) * b),
    ]
}

/// Alpha-blend towards `target` by `alpha` in 0..1.
pub fn blend_towards(rgb: Rgb, target: f32, alpha: f32) -> Rgb {
    let alpha = alpha.clamp(0.0, 1.0);
    rgb.map(|c| clamp_channel(c * (1.0 - alpha) + target * alpha))
}

// ── Brush colors ─────────────────────────────────────────────────────────

/// A straight-alpha 8-bit color picked for drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(0xFF, 0xFF, 0xFF);

    /// Swatches offered next to the custom color picker.
    pub const PRESETS: [Rgba; 8] = [
        Rgba::opaque(0xFF, 0xFF, 0xFF),
        Rgba::opaque(0xFE, 0x44, 0x38),
        Rgba::opaque(0xFF, 0x89, 0x01),
        Rgba::opaque(0xFF, 0xD6, 0x0A),
        Rgba::opaque(0x33, 0xC7, 0x59),
        Rgba::opaque(0x62, 0xE5, 0xE0),
        Rgba::opaque(0x0A, 0x84, 0xFF),
        Rgba::opaque(0xBD, 0x5C, 0xF3),
    ];

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Mix a picked hue with white and then black, as the picker's
    /// lightness sliders do. Both fractions are in 0..1.
    pub fn blended(self, white: f32, black: f32) -> Self {
        let white = white.clamp(0.0, 1.0);
        let black = black.clamp(0.0, 1.0);
        let mix = |c: u8| {
            let lifted = 255.0 * white + c as f32 * (1.0 - white);
            to_channel(lifted * (1.0 - black))
        };
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
            a: self.a,
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgba {
    type Err = anyhow::Error;

    /// Accepts `#RRGGBB` or `rgb(r, g, b)`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                bail!("invalid hex color: {s}");
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .with_context(|| format!("invalid hex color: {s}"))
            };
            return Ok(Self::opaque(channel(0)?, channel(2)?, channel(4)?));
        }

        let inner = s
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .with_context(|| format!("invalid RGB format: {s}"))?;
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            bail!("invalid RGB format: {s}");
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
                bail!("invalid RGB format: {s}");
            }
            let value: u16 = part.parse()?;
            if value > 255 {
                bail!("RGB values must be between 0 and 255: {s}");
            }
            *slot = value as u8;
        }
        Ok(Self::opaque(channels[0], channels[1], channels[2]))
    }
}
