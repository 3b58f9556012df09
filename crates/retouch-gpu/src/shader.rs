use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::debug;

/// WGSL sources compiled into the binary, by pass name.
pub const BUILTIN_SHADERS: [(&str, &str); 2] = [
    ("adjust", include_str!("../shaders/adjust.wgsl")),
    ("sharpen", include_str!("../shaders/sharpen.wgsl")),
];

/// Compiled compute modules and the pipelines built from them.
#[derive(Default)]
pub struct ShaderManager {
    modules: HashMap<&'static str, wgpu::ShaderModule>,
    pipelines: HashMap<&'static str, wgpu::ComputePipeline>,
}

impl ShaderManager {
    /// Compile every built-in pass.
    pub fn with_builtins(device: &wgpu::Device) -> Self {
        let mut shaders = Self::default();
        for (name, source) in BUILTIN_SHADERS {
            shaders.load_shader(device, name, source);
        }
        shaders
    }

    pub fn load_shader(&mut self, device: &wgpu::Device, name: &'static str, source: &str) {
        debug!(name, "compiling compute shader");
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        self.modules.insert(name, module);
        self.pipelines.remove(name);
    }

    pub fn get_or_create_pipeline(
        &mut self,
        device: &wgpu::Device,
        name: &'static str,
        bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Result<&wgpu::ComputePipeline> {
        if !self.pipelines.contains_key(name) {
            let module = self
                .modules
                .get(name)
                .with_context(|| format!("shader not loaded: {name}"))?;

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{name}_layout")),
                bind_group_layouts: &[bind_group_layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(name),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            });
            self.pipelines.insert(name, pipeline);
        }

        self.pipelines
            .get(name)
            .with_context(|| format!("pipeline missing after creation: {name}"))
    }
}
