use std::f64::consts::{PI, TAU};

use glam::DVec3;

use crate::math::mesh::{Resolution, SurfaceMesh, VertexAttributes, grid_triangle_indices};

/// Disk of radius `max_radius` rippled by a radial cosine:
///
/// `P(r, β) = (r cos β, r sin β, amplitude · cos(harmonic · π · r / wave_radius))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleSurface {
    pub amplitude: f64,
    pub harmonic: f64,
    pub wave_radius: f64,
    pub max_radius: f64,
}

impl Default for RippleSurface {
    fn default() -> Self {
        Self {
            amplitude: 0.1,
            harmonic: 1.0,
            wave_radius: 0.1,
            max_radius: 1.0,
        }
    }
}

impl RippleSurface {
    fn wave_number(&self) -> f64 {
        self.harmonic * PI / self.wave_radius
    }

    pub fn position(&self, r: f64, beta: f64) -> DVec3 {
        DVec3::new(
            r * beta.cos(),
            r * beta.sin(),
            self.amplitude * (self.wave_number() * r).cos(),
        )
    }

    /// ∂P/∂r.
    pub fn d_radius(&self, r: f64, beta: f64) -> DVec3 {
        let k = self.wave_number();
        DVec3::new(beta.cos(), beta.sin(), -self.amplitude * k * (k * r).sin())
    }

    /// ∂P/∂β. Vanishes at the center.
    pub fn d_angle(&self, r: f64, beta: f64) -> DVec3 {
        DVec3::new(-r * beta.sin(), r * beta.cos(), 0.0)
    }

    /// Unit direction of ∂P/∂β. At `r = 0` the derivative is zero, so the limit
    /// direction `(-sin β, cos β, 0)` is used instead.
    pub fn angular_direction(&self, r: f64, beta: f64) -> DVec3 {
        let d = self.d_angle(r, beta);
        if d.length_squared() > f64::EPSILON {
            d.normalize()
        } else {
            DVec3::new(-beta.sin(), beta.cos(), 0.0)
        }
    }
}

/// Frame of the surface at one parameter point.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceFrame {
    pub position: DVec3,
    pub normal: DVec3,
    pub tangent: DVec3,
    pub bitangent: DVec3,
}

impl RippleSurface {
    pub fn frame(&self, r: f64, beta: f64) -> SurfaceFrame {
        let tangent = self.d_radius(r, beta).normalize_or(DVec3::X);
        let along_ring = self.angular_direction(r, beta);
        let normal = tangent.cross(along_ring).normalize_or(DVec3::Z);
        let bitangent = normal.cross(tangent);

        SurfaceFrame {
            position: self.position(r, beta),
            normal,
            tangent,
            bitangent,
        }
    }
}

/// Builds [`SurfaceMesh`]es for a fixed [`RippleSurface`]. Generation is a pure
/// function of the resolution: the same input always yields the same output.
#[derive(Debug, Clone)]
pub struct SurfaceGenerator {
    surface: RippleSurface,
    attributes: VertexAttributes,
}

impl SurfaceGenerator {
    pub fn new(surface: RippleSurface) -> Self {
        Self {
            surface,
            attributes: VertexAttributes::all(),
        }
    }

    pub fn with_attributes(mut self, attributes: VertexAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn generate(&self, resolution: Resolution) -> SurfaceMesh {
        let u_steps = resolution.u_steps();
        let v_steps = resolution.v_steps();
        let vertex_count = resolution.vertex_count();

        let du = self.surface.max_radius / u_steps as f64;
        let dv = TAU / v_steps as f64;

        let want = |flag| self.attributes.contains(flag);
        let reserve = |flag| if want(flag) { vertex_count } else { 0 };

        let mut positions = Vec::with_capacity(reserve(VertexAttributes::POSITIONS));
        let mut normals = Vec::with_capacity(reserve(VertexAttributes::NORMALS));
        let mut tangents = Vec::with_capacity(reserve(VertexAttributes::TANGENTS));
        let mut bitangents = Vec::with_capacity(reserve(VertexAttributes::BITANGENTS));
        let mut uvs = Vec::with_capacity(reserve(VertexAttributes::UVS));

        for i in 0..=u_steps {
            let u = i as f64 * du;
            let uv_u = (i as f64 / u_steps as f64).clamp(0.0, 1.0);

            for j in 0..=v_steps {
                let v = j as f64 * dv;
                let frame = self.surface.frame(u, v);

                if want(VertexAttributes::POSITIONS) {
                    positions.push(frame.position.as_vec3().to_array());
                }
                if want(VertexAttributes::NORMALS) {
                    normals.push(frame.normal.as_vec3().to_array());
                }
                if want(VertexAttributes::TANGENTS) {
                    tangents.push(frame.tangent.as_vec3().to_array());
                }
                if want(VertexAttributes::BITANGENTS) {
                    bitangents.push(frame.bitangent.as_vec3().to_array());
                }
                if want(VertexAttributes::UVS) {
                    let uv_v = (j as f64 / v_steps as f64).clamp(0.0, 1.0);
                    uvs.push([uv_u as f32, uv_v as f32]);
                }
            }
        }

        SurfaceMesh {
            resolution,
            positions,
            normals,
            tangents,
            bitangents,
            uvs,
            indices: grid_triangle_indices(resolution),
        }
    }
}

impl Default for SurfaceGenerator {
    fn default() -> Self {
        Self::new(RippleSurface::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use glam::Vec3;

    fn generate(u_steps: u32, v_steps: u32) -> SurfaceMesh {
        let res = Resolution::new(u_steps, v_steps).unwrap();
        SurfaceGenerator::default().generate(res)
    }

    #[test]
    fn counts_match_resolution() {
        for (u, v) in [(1, 1), (1, 4), (2, 2), (3, 7), (16, 9), (40, 80)] {
            let mesh = generate(u, v);
            let expected = ((u + 1) * (v + 1)) as usize;
            assert_eq!(mesh.positions.len(), expected);
            assert_eq!(mesh.normals.len(), expected);
            assert_eq!(mesh.tangents.len(), expected);
            assert_eq!(mesh.bitangents.len(), expected);
            assert_eq!(mesh.uvs.len(), expected);
            assert_eq!(mesh.indices.len(), (6 * u * v) as usize);
            assert!(mesh.indices.iter().all(|&i| (i as usize) < expected));
        }
    }

    #[test]
    fn small_disk_scenario() {
        let mesh = generate(1, 4);
        assert_eq!(mesh.positions.len(), 10);
        assert_eq!(mesh.indices.len(), 24);

        let center = Vec3::from_array(mesh.positions[0]);
        assert_abs_diff_eq!(center, Vec3::new(0.0, 0.0, 0.1), epsilon = 1e-6);

        // i = 1, j = 0 lives at index 1 * (4 + 1) + 0.
        let rim = Vec3::from_array(mesh.positions[5]);
        let z = 0.1 * (std::f64::consts::PI / 0.1).cos();
        assert_abs_diff_eq!(rim, Vec3::new(1.0, 0.0, z as f32), epsilon = 1e-5);
    }

    #[test]
    fn first_triangle_of_two_by_two() {
        let mesh = generate(2, 2);
        assert_eq!(&mesh.indices[..3], &[0, 3, 4]);
    }

    #[test]
    fn normals_are_unit_including_center_ring() {
        let mesh = generate(12, 17);
        for n in &mesh.normals {
            let n = Vec3::from_array(*n);
            assert!(n.is_finite());
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-5);
        }

        // The whole i = 0 ring sits on the degenerate center point.
        for j in 0..=17 {
            let n = Vec3::from_array(mesh.normals[j]);
            assert_abs_diff_eq!(n, Vec3::Z, epsilon = 1e-5);
        }
    }

    #[test]
    fn tangent_frame_is_orthonormal() {
        let mesh = generate(9, 13);
        for k in 0..mesh.positions.len() {
            let n = Vec3::from_array(mesh.normals[k]);
            let t = Vec3::from_array(mesh.tangents[k]);
            let b = Vec3::from_array(mesh.bitangents[k]);
            assert_relative_eq!(t.length(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(b.length(), 1.0, epsilon = 1e-5);
            assert_abs_diff_eq!(n.dot(t), 0.0, epsilon = 1e-5);
            assert_abs_diff_eq!(n.dot(b), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn uvs_stay_in_unit_square_and_hit_corners() {
        let mesh = generate(7, 11);
        for uv in &mesh.uvs {
            assert!((0.0..=1.0).contains(&uv[0]));
            assert!((0.0..=1.0).contains(&uv[1]));
        }
        assert_eq!(mesh.uvs[0], [0.0, 0.0]);
        assert_eq!(*mesh.uvs.last().unwrap(), [1.0, 1.0]);
    }

    #[test]
    fn positions_follow_row_major_layout() {
        let (u_steps, v_steps) = (5, 6);
        let mesh = generate(u_steps, v_steps);
        let surface = RippleSurface::default();
        let du = surface.max_radius / u_steps as f64;
        let dv = std::f64::consts::TAU / v_steps as f64;

        for i in 0..=u_steps {
            for j in 0..=v_steps {
                let k = mesh.resolution.vertex_index(i, j) as usize;
                let expected = surface.position(i as f64 * du, j as f64 * dv).as_vec3();
                assert_abs_diff_eq!(Vec3::from_array(mesh.positions[k]), expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate(5, 5), generate(5, 5));
    }

    #[test]
    fn seam_vertices_are_duplicated() {
        let (u_steps, v_steps) = (4, 8);
        let mesh = generate(u_steps, v_steps);
        for i in 0..=u_steps {
            let first = mesh.resolution.vertex_index(i, 0);
            let last = mesh.resolution.vertex_index(i, v_steps);
            assert_ne!(first, last);
            assert_abs_diff_eq!(
                Vec3::from_array(mesh.positions[first as usize]),
                Vec3::from_array(mesh.positions[last as usize]),
                epsilon = 1e-5
            );
            assert_eq!(mesh.uvs[first as usize][1], 0.0);
            assert_eq!(mesh.uvs[last as usize][1], 1.0);
        }
    }

    #[test]
    fn triangles_face_along_the_normal() {
        // Gentle slope so a single cell spans only a small part of a wave.
        let surface = RippleSurface {
            amplitude: 0.05,
            harmonic: 1.0,
            wave_radius: 1.0,
            max_radius: 1.0,
        };
        let mesh = SurfaceGenerator::new(surface).generate(Resolution::new(16, 24).unwrap());
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(mesh.positions[i as usize]));
            let face = (b - a).cross(c - a);
            if face.length_squared() < 1e-12 {
                continue;
            }
            let n = Vec3::from_array(mesh.normals[tri[0] as usize]);
            assert!(face.dot(n) > 0.0);
        }
    }

    #[test]
    fn attribute_selection_leaves_other_arrays_empty() {
        let res = Resolution::new(3, 3).unwrap();
        let mesh = SurfaceGenerator::default()
            .with_attributes(VertexAttributes::POSITIONS | VertexAttributes::NORMALS)
            .generate(res);
        assert_eq!(mesh.positions.len(), 16);
        assert_eq!(mesh.normals.len(), 16);
        assert!(mesh.tangents.is_empty());
        assert!(mesh.bitangents.is_empty());
        assert!(mesh.uvs.is_empty());
        assert_eq!(mesh.indices.len(), 54);
    }

    #[test]
    fn angular_direction_falls_back_at_center() {
        let surface = RippleSurface::default();
        let d = surface.angular_direction(0.0, std::f64::consts::FRAC_PI_2);
        assert_abs_diff_eq!(d.x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.y, 0.0, epsilon = 1e-12);
    }
}
