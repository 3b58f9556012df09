use anyhow::{Result, ensure};
use tracing::debug;

use retouch_core::params::EnhanceParams;
use retouch_core::pipeline::ColorRenderer;
use retouch_core::pipeline::modules::fresh_seed;
use retouch_core::surface::Surface;

use crate::context::GpuContext;
use crate::pipeline::{ColorUniform, GpuPipeline};
use crate::texture::GpuTexture;

/// Accelerated color stage behind the same seam as the CPU pipeline.
pub struct GpuColorRenderer {
    ctx: GpuContext,
    pipeline: GpuPipeline,
}

impl GpuColorRenderer {
    pub async fn new() -> Result<Self> {
        let ctx = GpuContext::new().await?;
        Ok(Self::from_context(ctx))
    }

    pub fn from_context(ctx: GpuContext) -> Self {
        let pipeline = GpuPipeline::new(&ctx);
        Self {
            ctx,
            pipeline,
        }
    }

    pub fn adapter_name(&self) -> &str {
        &self.ctx.adapter_name
    }
}

impl ColorRenderer for GpuColorRenderer {
    fn name(&self) -> &str {
        "gpu"
    }

    fn render(&mut self, source: &Surface, params: &EnhanceParams) -> Result<Surface> {
        if params.is_unedited() {
            return Ok(source.clone());
        }
        let max = self.ctx.max_dimension();
        ensure!(
            source.width <= max && source.height <= max,
            "{}x{} exceeds the GPU texture limit of {max}",
            source.width,
            source.height
        );

        let uniform = ColorUniform::new(params, source.width, source.height, fresh_seed());
        let input = GpuTexture::from_surface(&self.ctx.device, &self.ctx.queue, source, "color_in")?;
        let output = self.pipeline.process(&self.ctx, &input, &uniform)?;
        debug!(width = source.width, height = source.height, "GPU color render");
        output.download(&self.ctx.device, &self.ctx.queue)
    }

    fn is_accelerated(&self) -> bool {
        true
    }
}
