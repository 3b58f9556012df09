use std::fmt;

use serde::{Deserialize, Serialize};

/// One enhancement slider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Enhance,
    Brightness,
    Contrast,
    Saturation,
    Warmth,
    Fade,
    Highlights,
    Shadows,
    Vignette,
    Grain,
    Sharpen,
}

impl Filter {
    /// Slider order as presented to the user.
    pub const ALL: [Filter; 11] = [
        Filter::Enhance,
        Filter::Brightness,
        Filter::Contrast,
        Filter::Saturation,
        Filter::Warmth,
        Filter::Fade,
        Filter::Highlights,
        Filter::Shadows,
        Filter::Vignette,
        Filter::Grain,
        Filter::Sharpen,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Filter::Enhance => "Enhance",
            Filter::Brightness => "Brightness",
            Filter::Contrast => "Contrast",
            Filter::Saturation => "Saturation",
            Filter::Warmth => "Warmth",
            Filter::Fade => "Fade",
            Filter::Highlights => "Highlights",
            Filter::Shadows => "Shadows",
            Filter::Vignette => "Vignette",
            Filter::Grain => "Grain",
            Filter::Sharpen => "Sharpen",
        }
    }

    pub fn range(self) -> FilterRange {
        match self {
            Filter::Enhance | Filter::Fade | Filter::Vignette | Filter::Grain | Filter::Sharpen => {
                FilterRange::ONE_SIDED
            }
            Filter::Brightness
            | Filter::Contrast
            | Filter::Saturation
            | Filter::Warmth
            | Filter::Highlights
            | Filter::Shadows => FilterRange::BIPOLAR,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Legal slider range of a filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterRange {
    pub min: f32,
    pub max: f32,
    /// Where the neutral value sits on the track, in percent of its length.
    /// The slider fill is drawn from here towards the thumb.
    pub split_percent: f32,
}

impl FilterRange {
    pub const ONE_SIDED: Self = Self {
        min: 0.0,
        max: 100.0,
        split_percent: 0.0,
    };

    pub const BIPOLAR: Self = Self {
        min: -100.0,
        max: 100.0,
        split_percent: 50.0,
    };

    /// Clamp into range. NaN collapses to the neutral value.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(self.min, self.max)
    }

    /// Position of `value` along the track in percent.
    pub fn percent_of(&self, value: f32) -> f32 {
        (self.clamp(value) - self.min) / (self.max - self.min) * 100.0
    }
}

/// Enhancement slider values. Zero everywhere means "unedited".
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceParams {
    pub enhance: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub warmth: f32,
    pub fade: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub vignette: f32,
    pub grain: f32,
    pub sharpen: f32,
}

impl EnhanceParams {
    pub fn get(&self, filter: Filter) -> f32 {
        match filter {
            Filter::Enhance => self.enhance,
            Filter::Brightness => self.brightness,
            Filter::Contrast => self.contrast,
            Filter::Saturation => self.saturation,
            Filter::Warmth => self.warmth,
            Filter::Fade => self.fade,
            Filter::Highlights => self.highlights,
            Filter::Shadows => self.shadows,
            Filter::Vignette => self.vignette,
            Filter::Grain => self.grain,
            Filter::Sharpen => self.sharpen,
        }
    }

    /// Store a value clamped to the filter's range; returns what was stored.
    pub fn set(&mut self, filter: Filter, value: f32) -> f32 {
        let value = filter.range().clamp(value);
        let slot = match filter {
            Filter::Enhance => &mut self.enhance,
            Filter::Brightness => &mut self.brightness,
            Filter::Contrast => &mut self.contrast,
            Filter::Saturation => &mut self.saturation,
            Filter::Warmth => &mut self.warmth,
            Filter::Fade => &mut self.fade,
            Filter::Highlights => &mut self.highlights,
            Filter::Shadows => &mut self.shadows,
            Filter::Vignette => &mut self.vignette,
            Filter::Grain => &mut self.grain,
            Filter::Sharpen => &mut self.sharpen,
        };
        *slot = value;
        value
    }

    pub fn iter(&self) -> impl Iterator<Item = (Filter, f32)> + '_ {
        Filter::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    /// Clamp every value into its range, e.g. after deserializing.
    pub fn clamped(mut self) -> Self {
        for filter in Filter::ALL {
            let value = self.get(filter);
            self.set(filter, value);
        }
        self
    }

    pub fn is_unedited(&self) -> bool {
        *self == Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
