use glam::{Vec2, Vec3};
use tracing::info;

use crate::config::AppConfig;
use crate::error::MeshError;
use crate::math::{
    LightOrbit, Resolution, RippleSurface, SurfaceGenerator, SurfaceMesh, VertexAttributes,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Surface,
    Uv,
}

/// Snapshot of everything the user can change that affects what is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneParams {
    pub circle_count: u32,
    pub segments_count: u32,
    pub angle_deg: f32,
    pub light_u: f32,
    pub light_v: f32,
    pub uv_center: Vec2,
    pub view_mode: ViewMode,
    pub show_wireframe: bool,
}

impl SceneParams {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            circle_count: config.mesh.circle_count,
            segments_count: config.mesh.segments_count,
            angle_deg: config.view.angle,
            light_u: config.light.u,
            light_v: config.light.v,
            uv_center: Vec2::splat(0.5),
            view_mode: ViewMode::Surface,
            show_wireframe: false,
        }
    }

    pub fn resolution(&self) -> Result<Resolution, MeshError> {
        Resolution::new(self.circle_count, self.segments_count)
    }

    pub fn angle_rad(&self) -> f32 {
        self.angle_deg.to_radians()
    }
}

/// Owns the generator and the mesh currently handed to the renderer.
pub struct Scene {
    generator: SurfaceGenerator,
    light: LightOrbit,
    mesh: Option<SurfaceMesh>,
    error: Option<MeshError>,
}

impl Scene {
    pub fn new(surface: RippleSurface, attributes: VertexAttributes) -> Self {
        Self {
            generator: SurfaceGenerator::new(surface).with_attributes(attributes),
            light: LightOrbit::default(),
            mesh: None,
            error: None,
        }
    }

    pub fn mesh(&self) -> Option<&SurfaceMesh> {
        self.mesh.as_ref()
    }

    /// Error from the most recent `sync`, if it rejected the parameters.
    pub fn error(&self) -> Option<&MeshError> {
        self.error.as_ref()
    }

    /// Rebuilds the mesh when the requested resolution differs from the
    /// current one. The new mesh is fully built before it replaces the old, and
    /// is returned so the caller can upload it.
    pub fn sync(&mut self, params: &SceneParams) -> Result<Option<&SurfaceMesh>, MeshError> {
        let resolution = match params.resolution() {
            Ok(resolution) => resolution,
            Err(e) => {
                self.error = Some(e.clone());
                return Err(e);
            }
        };
        self.error = None;
        if self.mesh.as_ref().is_some_and(|m| m.resolution == resolution) {
            return Ok(None);
        }

        let mesh = self.generator.generate(resolution);
        info!(
            u_steps = resolution.u_steps(),
            v_steps = resolution.v_steps(),
            vertices = mesh.vertex_count(),
            indices = mesh.index_count(),
            "regenerated surface mesh"
        );
        self.mesh = Some(mesh);
        Ok(self.mesh.as_ref())
    }

    pub fn light_position(&self, params: &SceneParams) -> Vec3 {
        self.light.position(params.light_u, params.light_v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::MAX_STEPS;

    fn params(circles: u32, segments: u32) -> SceneParams {
        let mut params = SceneParams::from_config(&AppConfig::default());
        params.circle_count = circles;
        params.segments_count = segments;
        params
    }

    fn scene() -> Scene {
        Scene::new(RippleSurface::default(), VertexAttributes::all())
    }

    #[test]
    fn first_sync_builds_mesh() {
        let mut scene = scene();
        assert!(scene.mesh().is_none());
        let mesh = scene.sync(&params(3, 4)).unwrap().unwrap();
        assert_eq!(mesh.vertex_count(), 20);
    }

    #[test]
    fn unchanged_resolution_does_not_regenerate() {
        let mut scene = scene();
        scene.sync(&params(3, 4)).unwrap();

        let mut moved_light = params(3, 4);
        moved_light.light_u = 120.0;
        moved_light.angle_deg = 45.0;
        assert!(scene.sync(&moved_light).unwrap().is_none());
    }

    #[test]
    fn resolution_change_replaces_mesh() {
        let mut scene = scene();
        scene.sync(&params(3, 4)).unwrap();
        let mesh = scene.sync(&params(5, 4)).unwrap().unwrap();
        assert_eq!(mesh.index_count(), 6 * 5 * 4);
        assert_eq!(scene.mesh().unwrap().resolution.u_steps(), 5);
    }

    #[test]
    fn invalid_resolution_keeps_previous_mesh() {
        let mut scene = scene();
        scene.sync(&params(3, 4)).unwrap();
        assert!(scene.sync(&params(0, 4)).is_err());
        assert_eq!(scene.mesh().unwrap().resolution.u_steps(), 3);
    }

    #[test]
    fn error_clears_when_resolution_returns_to_current() {
        let mut scene = scene();
        scene.sync(&params(3, 4)).unwrap();

        assert!(scene.sync(&params(3, MAX_STEPS + 1)).is_err());
        assert!(scene.error().is_some());

        assert!(scene.sync(&params(3, 4)).unwrap().is_none());
        assert!(scene.error().is_none());
    }

    #[test]
    fn selected_attributes_reach_the_mesh() {
        let mut scene = Scene::new(
            RippleSurface::default(),
            VertexAttributes::POSITIONS | VertexAttributes::UVS,
        );
        let mesh = scene.sync(&params(2, 3)).unwrap().unwrap();
        assert_eq!(mesh.attributes(), VertexAttributes::POSITIONS | VertexAttributes::UVS);
        assert!(mesh.normals.is_empty());
    }

    #[test]
    fn angle_is_converted_to_radians() {
        let mut p = params(1, 1);
        p.angle_deg = 180.0;
        assert!((p.angle_rad() - std::f32::consts::PI).abs() < 1e-6);
    }
}
