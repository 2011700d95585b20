pub mod light;
pub mod lines;
pub mod mesh;
pub mod surface;
pub mod uv;

pub use light::{LIGHT_CUBE_SIZE, LightOrbit, light_cube_vertices};
pub use mesh::{MAX_STEPS, Resolution, SurfaceMesh, VertexAttributes};
pub use surface::{RippleSurface, SurfaceGenerator};
