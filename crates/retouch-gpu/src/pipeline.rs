use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use tracing::debug;

use retouch_core::params::EnhanceParams;
use retouch_core::pipeline::modules::{
    brightness_factor, contrast_factor, enhance_factors, saturation_factor,
};

use crate::context::GpuContext;
use crate::shader::ShaderManager;
use crate::texture::GpuTexture;

const WORKGROUP_SIZE: u32 = 16;

/// Uniform shared by both passes. Factors are precomputed with the same
/// helpers the CPU modules use.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorUniform {
    pub enhance_contrast: f32,
    pub enhance_brightness: f32,
    pub enhance_saturation: f32,
    pub contrast: f32,
    pub brightness: f32,
    pub saturation: f32,
    pub warmth_shift: f32,
    pub fade_alpha: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub vignette: f32,
    pub grain_amplitude: f32,
    pub sharpen_mix: f32,
    pub seed: u32,
    pub width: u32,
    pub height: u32,
}

impl ColorUniform {
    pub fn new(params: &EnhanceParams, width: u32, height: u32, seed: u32) -> Self {
        let p = params.clamped();
        let (enhance_contrast, enhance_brightness, enhance_saturation) = enhance_factors(p.enhance);
        Self {
            enhance_contrast,
            enhance_brightness,
            enhance_saturation,
            contrast: contrast_factor(p.contrast),
            brightness: brightness_factor(p.brightness),
            saturation: saturation_factor(p.saturation),
            warmth_shift: -p.warmth / 5.0,
            fade_alpha: p.fade / 300.0,
            highlights: p.highlights,
            shadows: p.shadows,
            vignette: p.vignette,
            grain_amplitude: p.grain / 5.0,
            sharpen_mix: p.sharpen / 50.0,
            seed,
            width,
            height,
        }
    }
}

/// Color engine on the GPU: an `adjust` pass for every per-pixel filter,
/// followed by a `sharpen` pass when sharpening is on.
pub struct GpuPipeline {
    shaders: ShaderManager,
    layout: wgpu::BindGroupLayout,
}

impl GpuPipeline {
    pub fn new(ctx: &GpuContext) -> Self {
        Self {
            shaders: ShaderManager::with_builtins(&ctx.device),
            layout: Self::create_image_params_layout(&ctx.device),
        }
    }

    fn create_image_params_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let storage = |binding, access| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access,
                format: wgpu::TextureFormat::Rgba32Float,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("color_bgl"),
            entries: &[
                storage(0, wgpu::StorageTextureAccess::ReadOnly),
                storage(1, wgpu::StorageTextureAccess::WriteOnly),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    pub fn process(
        &mut self,
        ctx: &GpuContext,
        input: &GpuTexture,
        uniform: &ColorUniform,
    ) -> Result<GpuTexture> {
        let params_buf = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("color_params"),
            size: std::mem::size_of::<ColorUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ctx.queue
            .write_buffer(&params_buf, 0, bytemuck::bytes_of(uniform));

        let adjusted = self.run_pass(ctx, "adjust", input, &params_buf)?;
        if uniform.sharpen_mix == 0.0 {
            return Ok(adjusted);
        }
        self.run_pass(ctx, "sharpen", &adjusted, &params_buf)
    }

    fn run_pass(
        &mut self,
        ctx: &GpuContext,
        name: &'static str,
        input: &GpuTexture,
        params_buf: &wgpu::Buffer,
    ) -> Result<GpuTexture> {
        debug!(pass = name, width = input.width, height = input.height, "GPU pass");
        let output = GpuTexture::create_storage(&ctx.device, input.width, input.height, name);

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&input.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&output.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buf.as_entire_binding(),
                },
            ],
        });

        let pipeline = self
            .shaders
            .get_or_create_pipeline(&ctx.device, name, &self.layout)?;

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(name),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(name),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(
                input.width.div_ceil(WORKGROUP_SIZE),
                input.height.div_ceil(WORKGROUP_SIZE),
                1,
            );
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));

        Ok(output)
    }
}
