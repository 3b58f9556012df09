pub mod context;
pub mod pipeline;
pub mod renderer;
pub mod shader;
pub mod texture;

pub use renderer::GpuColorRenderer;
