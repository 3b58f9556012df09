use anyhow::{Result, anyhow, ensure};
use retouch_core::color::to_channel;
use retouch_core::surface::Surface;

/// Four f32 channels.
const BYTES_PER_PIXEL: u32 = 16;

/// RGBA f32 storage texture holding 0..255 channel values.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl GpuTexture {
    /// Upload an 8-bit surface without rescaling the channels.
    pub fn from_surface(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface: &Surface,
        label: &str,
    ) -> Result<Self> {
        ensure!(!surface.is_empty(), "cannot upload an empty surface");
        let texture = Self::create_storage(device, surface.width, surface.height, label);
        let texels: Vec<f32> = surface.data.iter().map(|&v| v as f32).collect();
        queue.write_texture(
            texture.copy_info(),
            bytemuck::cast_slice(&texels),
            row_layout(surface.width * BYTES_PER_PIXEL, surface.height),
            texture.extent(),
        );
        Ok(texture)
    }

    /// Empty texture usable as compute input, output and copy source.
    pub fn create_storage(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    fn copy_info(&self) -> wgpu::TexelCopyTextureInfo<'_> {
        wgpu::TexelCopyTextureInfo {
            texture: &self.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        }
    }

    /// Read back into an 8-bit surface. Blocks until the copy is done.
    pub fn download(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Surface> {
        let padded = padded_row_bytes(self.width);
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("surface_readback"),
            size: padded as u64 * self.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("surface_readback"),
        });
        encoder.copy_texture_to_buffer(
            self.copy_info(),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: row_layout(padded, self.height),
            },
            self.extent(),
        );
        queue.submit(std::iter::once(encoder.finish()));

        map_blocking(device, &staging)?;
        let data = {
            let mapped = staging.slice(..).get_mapped_range();
            unpack_rows(&mapped, self.width, self.height, padded)
        };
        staging.unmap();

        Surface::from_data(self.width, self.height, data)
    }
}

fn row_layout(bytes_per_row: u32, rows: u32) -> wgpu::TexelCopyBufferLayout {
    wgpu::TexelCopyBufferLayout {
        offset: 0,
        bytes_per_row: Some(bytes_per_row),
        rows_per_image: Some(rows),
    }
}

/// Row stride of a readback buffer; copies need 256-byte aligned rows.
fn padded_row_bytes(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * BYTES_PER_PIXEL).div_ceil(align) * align
}

fn map_blocking(device: &wgpu::Device, buffer: &wgpu::Buffer) -> Result<()> {
    let (sender, receiver) = std::sync::mpsc::channel();
    buffer
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .map_err(|e| anyhow!("GPU poll error: {e}"))?;
    receiver
        .recv()
        .map_err(|_| anyhow!("buffer map cancelled"))??;
    Ok(())
}

/// Drop row padding and quantize f32 channels to bytes.
fn unpack_rows(mapped: &[u8], width: u32, height: u32, padded: u32) -> Vec<u8> {
    let row_len = (width * BYTES_PER_PIXEL) as usize;
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for row in mapped.chunks(padded as usize).take(height as usize) {
        let floats: &[f32] = bytemuck::cast_slice(&row[..row_len]);
        data.extend(floats.iter().map(|&v| to_channel(v)));
    }
    data
}
