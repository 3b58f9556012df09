use anyhow::{Context, Result, bail};
use tracing::{debug, info};

/// Adapter requests tried in order; the last one accepts a software adapter.
const ADAPTER_PREFERENCES: [(wgpu::PowerPreference, bool); 3] = [
    (wgpu::PowerPreference::HighPerformance, false),
    (wgpu::PowerPreference::LowPower, false),
    (wgpu::PowerPreference::None, true),
];

/// wgpu device and queue shared by the color passes.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_name: String,
}

impl GpuContext {
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = pick_adapter(&instance).await?;

        let info = adapter.get_info();
        info!(
            adapter = info.name.as_str(),
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        // Ask for the adapter's real texture size so large photos fit in one
        // texture where the hardware allows it.
        let required_limits = wgpu::Limits::default().using_resolution(adapter.limits());
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("retouch"),
                required_features: wgpu::Features::empty(),
                required_limits,
                ..Default::default()
            })
            .await
            .context("failed to create GPU device")?;

        Ok(Self {
            device,
            queue,
            adapter_name: info.name,
        })
    }

    /// Largest image side a single texture can hold.
    pub fn max_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

async fn pick_adapter(instance: &wgpu::Instance) -> Result<wgpu::Adapter> {
    for (power_preference, force_fallback_adapter) in ADAPTER_PREFERENCES {
        let request = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await;
        match request {
            Ok(adapter) => return Ok(adapter),
            Err(err) => debug!(
                ?power_preference,
                force_fallback_adapter,
                error = %err,
                "adapter request failed"
            ),
        }
    }
    bail!("no suitable GPU adapter found")
}
