use anyhow::Result;

use crate::params::EnhanceParams;
use crate::surface::Surface;

/// A single step in the color pipeline.
///
/// A module whose parameter is zero must hand its input back untouched.
pub trait ProcessingModule: Send + Sync {
    fn name(&self) -> &str;
    fn process_cpu(&self, input: Surface, params: &EnhanceParams) -> Result<Surface>;
}
