use std::num::NonZeroU32;

use bitflags::bitflags;

use crate::error::MeshError;

/// Largest step count the device buffers are sized for, per parameter axis.
pub const MAX_STEPS: u32 = 256;

bitflags! {
    /// Which per-vertex attribute arrays a generator fills in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexAttributes: u8 {
        const POSITIONS = 1 << 0;
        const NORMALS = 1 << 1;
        const TANGENTS = 1 << 2;
        const BITANGENTS = 1 << 3;
        const UVS = 1 << 4;
    }
}

/// Grid resolution over the parameter domain: `u_steps` rings by `v_steps`
/// angular segments. Always at least one cell in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    u_steps: NonZeroU32,
    v_steps: NonZeroU32,
}

impl Resolution {
    pub fn new(u_steps: u32, v_steps: u32) -> Result<Self, MeshError> {
        let invalid = MeshError::InvalidResolution { u_steps, v_steps };
        if u_steps > MAX_STEPS || v_steps > MAX_STEPS {
            return Err(invalid);
        }
        match (NonZeroU32::new(u_steps), NonZeroU32::new(v_steps)) {
            (Some(u_steps), Some(v_steps)) => Ok(Self { u_steps, v_steps }),
            _ => Err(invalid),
        }
    }

    pub fn u_steps(&self) -> u32 {
        self.u_steps.get()
    }

    pub fn v_steps(&self) -> u32 {
        self.v_steps.get()
    }

    pub fn vertex_count(&self) -> usize {
        (self.u_steps() as usize + 1) * (self.v_steps() as usize + 1)
    }

    pub fn index_count(&self) -> usize {
        6 * self.u_steps() as usize * self.v_steps() as usize
    }

    /// Row-major vertex index of grid point `(i, j)`.
    pub fn vertex_index(&self, i: u32, j: u32) -> u32 {
        i * (self.v_steps() + 1) + j
    }
}

/// Generated surface geometry. Attribute arrays are parallel: entry `k` of
/// every non-empty array belongs to the same vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    pub resolution: Resolution,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tangents: Vec<[f32; 3]>,
    pub bitangents: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    pub fn vertex_count(&self) -> usize {
        self.resolution.vertex_count()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Attribute arrays that hold one entry per vertex.
    pub fn attributes(&self) -> VertexAttributes {
        let n = self.vertex_count();
        let mut attributes = VertexAttributes::empty();
        attributes.set(VertexAttributes::POSITIONS, self.positions.len() == n);
        attributes.set(VertexAttributes::NORMALS, self.normals.len() == n);
        attributes.set(VertexAttributes::TANGENTS, self.tangents.len() == n);
        attributes.set(VertexAttributes::BITANGENTS, self.bitangents.len() == n);
        attributes.set(VertexAttributes::UVS, self.uvs.len() == n);
        attributes
    }
}

/// Two triangles per grid cell with the same corner ordering everywhere, so
/// winding never flips across the grid.
pub fn grid_triangle_indices(resolution: Resolution) -> Vec<u32> {
    let mut indices = Vec::with_capacity(resolution.index_count());

    for i in 0..resolution.u_steps() {
        for j in 0..resolution.v_steps() {
            let tl = resolution.vertex_index(i, j);
            let tr = resolution.vertex_index(i, j + 1);
            let bl = resolution.vertex_index(i + 1, j);
            let br = resolution.vertex_index(i + 1, j + 1);

            indices.push(tl);
            indices.push(bl);
            indices.push(br);

            indices.push(tl);
            indices.push(br);
            indices.push(tr);
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_rejects_zero_and_oversized_steps() {
        assert!(Resolution::new(0, 4).is_err());
        assert!(Resolution::new(4, 0).is_err());
        assert!(Resolution::new(MAX_STEPS + 1, 1).is_err());
        assert!(Resolution::new(MAX_STEPS, MAX_STEPS).is_ok());
    }

    #[test]
    fn vertex_index_is_row_major() {
        let res = Resolution::new(3, 2).unwrap();
        assert_eq!(res.vertex_index(0, 0), 0);
        assert_eq!(res.vertex_index(0, 2), 2);
        assert_eq!(res.vertex_index(1, 0), 3);
        assert_eq!(res.vertex_index(3, 2), 11);
        assert_eq!(res.vertex_count(), 12);
    }

    #[test]
    fn first_cell_uses_expected_corners() {
        let res = Resolution::new(2, 2).unwrap();
        let indices = grid_triangle_indices(res);
        assert_eq!(&indices[..6], &[0, 3, 4, 0, 4, 1]);
    }

    #[test]
    fn index_count_and_range() {
        let res = Resolution::new(7, 5).unwrap();
        let indices = grid_triangle_indices(res);
        assert_eq!(indices.len(), res.index_count());
        assert!(indices.iter().all(|&i| (i as usize) < res.vertex_count()));
    }
}
