pub mod module;
pub mod modules;

use anyhow::Result;
use tracing::debug;

use crate::params::EnhanceParams;
use crate::surface::Surface;
use module::ProcessingModule;

/// Color engine: chains the enhancement modules in a fixed order.
///
/// ```text
/// Source -> Enhance -> Contrast -> Brightness -> Saturation -> Warmth
///        -> Highlights/Shadows -> Fade -> Vignette -> Grain -> Sharpen
/// ```
///
/// Each module reads the previous module's output, so the order changes the
/// result and must not be rearranged.
pub struct Pipeline {
    modules: Vec<Box<dyn ProcessingModule>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            modules: vec![
                Box::new(modules::Enhance),
                Box::new(modules::Contrast),
                Box::new(modules::Brightness),
                Box::new(modules::Saturation),
                Box::new(modules::Warmth),
                Box::new(modules::HighlightsShadows),
                Box::new(modules::Fade),
                Box::new(modules::Vignette),
                Box::new(modules::Grain::new()),
                Box::new(modules::Sharpen),
            ],
        }
    }

    /// Pipeline over an explicit module list, e.g. with a seeded grain.
    pub fn with_modules(modules: Vec<Box<dyn ProcessingModule>>) -> Self {
        Self { modules }
    }

    /// Run the full CPU pipeline on an input image with the given params.
    pub fn process_cpu(&self, input: Surface, params: &EnhanceParams) -> Result<Surface> {
        let mut current = input;
        for module in &self.modules {
            debug!(module = module.name(), "processing");
            current = module.process_cpu(current, params)?;
        }
        Ok(current)
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything that can produce the color stage's output surface.
///
/// The CPU [`Pipeline`] is the baseline; accelerated renderers implement
/// the same formulas in the same order.
pub trait ColorRenderer {
    fn name(&self) -> &str;

    fn render(&mut self, source: &Surface, params: &EnhanceParams) -> Result<Surface>;

    fn is_accelerated(&self) -> bool {
        false
    }
}

impl ColorRenderer for Pipeline {
    fn name(&self) -> &str {
        "cpu"
    }

    fn render(&mut self, source: &Surface, params: &EnhanceParams) -> Result<Surface> {
        self.process_cpu(source.clone(), &params.clamped())
    }
}
