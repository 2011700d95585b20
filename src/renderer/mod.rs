pub mod camera;
pub mod gpu;
pub mod mesh_buffers;
pub mod texture;

pub use camera::{Camera, SceneUniform};
pub use gpu::GpuState;
pub use mesh_buffers::SURFACE_ATTRIBUTES;
