use tracing::{debug, warn};

use crate::math::lines::{grid_lines, triangles_to_lines};
use crate::math::{MAX_STEPS, SurfaceMesh, VertexAttributes};

const MAX_VERTICES: usize = ((MAX_STEPS + 1) * (MAX_STEPS + 1)) as usize;
const MAX_INDICES: usize = (6 * MAX_STEPS * MAX_STEPS) as usize;
const MAX_UV_LINE_INDICES: usize = MAX_INDICES * 2;
const MAX_GRID_LINE_INDICES: usize =
    (((MAX_STEPS + 1) * MAX_STEPS + (MAX_STEPS + 1) * MAX_STEPS) * 2) as usize;

/// Every attribute the surface pipeline reads.
pub const SURFACE_ATTRIBUTES: VertexAttributes = VertexAttributes::all();

const VEC3_STRIDE: usize = std::mem::size_of::<[f32; 3]>();
const VEC2_STRIDE: usize = std::mem::size_of::<[f32; 2]>();
const INDEX_SIZE: usize = std::mem::size_of::<u32>();

/// Device-side copy of the current [`SurfaceMesh`], one buffer per attribute
/// plus the index lists drawn from it.
pub struct MeshBuffers {
    pub positions: wgpu::Buffer,
    pub normals: wgpu::Buffer,
    pub tangents: wgpu::Buffer,
    pub bitangents: wgpu::Buffer,
    pub uvs: wgpu::Buffer,

    pub indices: wgpu::Buffer,
    pub grid_lines: wgpu::Buffer,
    pub uv_lines: wgpu::Buffer,

    pub light_cube: wgpu::Buffer,

    vertex_count: u32,
    index_count: u32,
    grid_line_count: u32,
    uv_line_count: u32,
    light_vertex_count: u32,
}

fn attribute_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn index_buffer(device: &wgpu::Device, label: &str, count: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (count * INDEX_SIZE) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn missing_attributes(mesh: &SurfaceMesh) -> VertexAttributes {
    SURFACE_ATTRIBUTES.difference(mesh.attributes())
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device, light_cube: &[[f32; 3]]) -> Self {
        let light_cube_buffer =
            attribute_buffer(device, "Light Cube Buffer", light_cube.len() * VEC3_STRIDE);

        Self {
            positions: attribute_buffer(device, "Position Buffer", MAX_VERTICES * VEC3_STRIDE),
            normals: attribute_buffer(device, "Normal Buffer", MAX_VERTICES * VEC3_STRIDE),
            tangents: attribute_buffer(device, "Tangent Buffer", MAX_VERTICES * VEC3_STRIDE),
            bitangents: attribute_buffer(device, "Bitangent Buffer", MAX_VERTICES * VEC3_STRIDE),
            uvs: attribute_buffer(device, "UV Buffer", MAX_VERTICES * VEC2_STRIDE),
            indices: index_buffer(device, "Surface Index Buffer", MAX_INDICES),
            grid_lines: index_buffer(device, "Grid Line Index Buffer", MAX_GRID_LINE_INDICES),
            uv_lines: index_buffer(device, "UV Line Index Buffer", MAX_UV_LINE_INDICES),
            light_cube: light_cube_buffer,
            vertex_count: 0,
            index_count: 0,
            grid_line_count: 0,
            uv_line_count: 0,
            light_vertex_count: light_cube.len() as u32,
        }
    }

    pub fn upload_light_cube(&self, queue: &wgpu::Queue, vertices: &[[f32; 3]]) {
        queue.write_buffer(&self.light_cube, 0, bytemuck::cast_slice(vertices));
    }

    /// Replaces every buffer with the contents of `mesh`. A mesh that does not
    /// fit is rejected and the previous one stays current.
    pub fn upload(&mut self, queue: &wgpu::Queue, mesh: &SurfaceMesh) -> bool {
        let vertex_count = mesh.vertex_count();
        let missing = missing_attributes(mesh);
        if !missing.is_empty() {
            warn!(?missing, "mesh is missing vertex attributes, keeping previous upload");
            return false;
        }
        if vertex_count > MAX_VERTICES || mesh.indices.len() > MAX_INDICES {
            warn!(
                vertices = vertex_count,
                indices = mesh.indices.len(),
                "mesh exceeds buffer capacity, keeping previous upload"
            );
            return false;
        }

        let grid = grid_lines(mesh.resolution);
        let uv_lines = triangles_to_lines(&mesh.indices);

        queue.write_buffer(&self.positions, 0, bytemuck::cast_slice(&mesh.positions));
        queue.write_buffer(&self.normals, 0, bytemuck::cast_slice(&mesh.normals));
        queue.write_buffer(&self.tangents, 0, bytemuck::cast_slice(&mesh.tangents));
        queue.write_buffer(&self.bitangents, 0, bytemuck::cast_slice(&mesh.bitangents));
        queue.write_buffer(&self.uvs, 0, bytemuck::cast_slice(&mesh.uvs));
        queue.write_buffer(&self.indices, 0, bytemuck::cast_slice(&mesh.indices));
        queue.write_buffer(&self.grid_lines, 0, bytemuck::cast_slice(&grid));
        queue.write_buffer(&self.uv_lines, 0, bytemuck::cast_slice(&uv_lines));

        self.vertex_count = vertex_count as u32;
        self.index_count = mesh.indices.len() as u32;
        self.grid_line_count = grid.len() as u32;
        self.uv_line_count = uv_lines.len() as u32;

        debug!(
            vertices = self.vertex_count,
            indices = self.index_count,
            "uploaded surface mesh"
        );
        true
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn grid_line_count(&self) -> u32 {
        self.grid_line_count
    }

    pub fn uv_line_count(&self) -> u32 {
        self.uv_line_count
    }

    pub fn light_vertex_count(&self) -> u32 {
        self.light_vertex_count
    }
}

pub const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
pub const NORMAL_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
pub const TANGENT_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];
pub const BITANGENT_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x3];
pub const UV_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![4 => Float32x2];
pub const UV_ONLY_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

pub fn vec3_buffer_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VEC3_STRIDE as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

pub fn vec2_buffer_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VEC2_STRIDE as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

/// Surface pipeline inputs: positions, normals, tangents, bitangents, UVs.
pub fn surface_layouts() -> [wgpu::VertexBufferLayout<'static>; 5] {
    [
        vec3_buffer_layout(&POSITION_ATTRS),
        vec3_buffer_layout(&NORMAL_ATTRS),
        vec3_buffer_layout(&TANGENT_ATTRS),
        vec3_buffer_layout(&BITANGENT_ATTRS),
        vec2_buffer_layout(&UV_ATTRS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::SurfaceGenerator;

    #[test]
    fn capacities_fit_largest_resolution() {
        let res = crate::math::Resolution::new(MAX_STEPS, MAX_STEPS).unwrap();
        assert_eq!(res.vertex_count(), MAX_VERTICES);
        assert_eq!(res.index_count(), MAX_INDICES);
        assert_eq!(grid_lines(res).len(), MAX_GRID_LINE_INDICES);
    }

    #[test]
    fn attribute_locations_match_shader() {
        let locations: Vec<u32> = surface_layouts()
            .iter()
            .map(|l| l.attributes[0].shader_location)
            .collect();
        assert_eq!(locations, vec![0, 1, 2, 3, 4]);
        assert_eq!(surface_layouts()[4].array_stride, 8);
    }

    #[test]
    fn partial_meshes_are_not_uploadable() {
        let res = crate::math::Resolution::new(2, 2).unwrap();
        let full = SurfaceGenerator::default().generate(res);
        assert!(missing_attributes(&full).is_empty());

        let partial = SurfaceGenerator::default()
            .with_attributes(VertexAttributes::POSITIONS | VertexAttributes::UVS)
            .generate(res);
        assert_eq!(
            missing_attributes(&partial),
            VertexAttributes::NORMALS | VertexAttributes::TANGENTS | VertexAttributes::BITANGENTS
        );
    }
}
