use std::f32::consts::PI;

use glam::Vec3;

pub const LIGHT_CUBE_SIZE: f32 = 0.06;

/// Point light moving on a sphere around the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightOrbit {
    pub radius: f32,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self { radius: 2.0 }
    }
}

impl LightOrbit {
    /// `u_deg` sweeps azimuth (180° is a full turn), `v_deg` sweeps from the
    /// +Y pole (0°) to the -Y pole (180°).
    pub fn position(&self, u_deg: f32, v_deg: f32) -> Vec3 {
        let u = u_deg / 180.0;
        let v = v_deg / 180.0;
        Vec3::new(
            self.radius * (v * PI).sin() * (u * 2.0 * PI).cos(),
            self.radius * (v * PI).cos(),
            self.radius * (v * PI).sin() * (u * 2.0 * PI).sin(),
        )
    }
}

/// Axis-aligned cube as a plain triangle list, 36 vertices.
pub fn light_cube_vertices(size: f32) -> Vec<[f32; 3]> {
    let s = size;
    let faces: [[Vec3; 4]; 6] = [
        // +Z
        [Vec3::new(-s, -s, s), Vec3::new(s, -s, s), Vec3::new(s, s, s), Vec3::new(-s, s, s)],
        // -Z
        [Vec3::new(s, -s, -s), Vec3::new(-s, -s, -s), Vec3::new(-s, s, -s), Vec3::new(s, s, -s)],
        // -X
        [Vec3::new(-s, -s, -s), Vec3::new(-s, -s, s), Vec3::new(-s, s, s), Vec3::new(-s, s, -s)],
        // +X
        [Vec3::new(s, -s, s), Vec3::new(s, -s, -s), Vec3::new(s, s, -s), Vec3::new(s, s, s)],
        // +Y
        [Vec3::new(-s, s, s), Vec3::new(s, s, s), Vec3::new(s, s, -s), Vec3::new(-s, s, -s)],
        // -Y
        [Vec3::new(-s, -s, -s), Vec3::new(s, -s, -s), Vec3::new(s, -s, s), Vec3::new(-s, -s, s)],
    ];

    faces
        .iter()
        .flat_map(|[a, b, c, d]| [*a, *b, *c, *c, *d, *a])
        .map(|p| p.to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn light_stays_on_orbit() {
        let orbit = LightOrbit::default();
        for (u, v) in [(0.0, 0.0), (30.0, 45.0), (90.0, 90.0), (170.0, 180.0)] {
            assert_relative_eq!(orbit.position(u, v).length(), 2.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn poles_and_equator() {
        let orbit = LightOrbit::default();
        assert_abs_diff_eq!(orbit.position(0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
        assert_abs_diff_eq!(orbit.position(0.0, 90.0), Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
        assert_abs_diff_eq!(orbit.position(45.0, 90.0), Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn cube_faces_point_outward() {
        let verts = light_cube_vertices(LIGHT_CUBE_SIZE);
        assert_eq!(verts.len(), 36);
        for tri in verts.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(Vec3::from_array);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }
}
