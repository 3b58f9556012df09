mod brightness;
mod contrast;
mod enhance;
mod fade;
mod grain;
mod highlights_shadows;
mod saturation;
mod sharpen;
mod vignette;
mod warmth;

pub use brightness::{Brightness, brightness_factor};
pub use contrast::{Contrast, contrast_factor};
pub use enhance::{Enhance, enhance_factors};
pub use fade::Fade;
pub use grain::{Grain, fresh_seed, hash_unit};
pub use highlights_shadows::{HighlightsShadows, tone_offset};
pub use saturation::{Saturation, saturation_factor};
pub use sharpen::Sharpen;
pub use vignette::{Vignette, vignette_alpha};
pub use warmth::Warmth;
