use glam::{Mat4, Quat, Vec2, Vec3};

pub const ZOOM_STEP: f32 = 1.0;
pub const ZOOM_MIN: f32 = -60.0;
pub const ZOOM_MAX: f32 = -2.0;

/// Trackball-style viewer: the camera sits at the origin looking down -Z and
/// the model is rotated, tilted and pushed back by `zoom`.
pub struct Camera {
    pub rotation: Quat,
    pub zoom: f32,

    pub tilt_axis: Vec3,
    pub tilt_angle: f32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub rotate_sensitivity: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            zoom: -10.0,

            tilt_axis: Vec3::new(0.707, 0.707, 0.0).normalize(),
            tilt_angle: 0.7,

            fov: std::f32::consts::PI / 8.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,

            rotate_sensitivity: 0.01,
        }
    }
}

impl Camera {
    pub fn with_zoom(zoom: f32) -> Self {
        Self {
            zoom: zoom.clamp(ZOOM_MIN, ZOOM_MAX),
            ..Self::default()
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, self.zoom))
            * Mat4::from_axis_angle(self.tilt_axis, self.tilt_angle)
            * Mat4::from_quat(self.rotation)
    }

    /// Places an object at `position` in model space, so it follows the
    /// surface's rotation and zoom.
    pub fn model_matrix_at(&self, position: Vec3) -> Mat4 {
        self.model_matrix() * Mat4::from_translation(position)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Mouse drag in pixels. Horizontal motion spins about the screen Y axis,
    /// vertical motion about the screen X axis.
    pub fn process_drag(&mut self, delta: Vec2) {
        let angle = delta.length() * self.rotate_sensitivity;
        if angle <= f32::EPSILON {
            return;
        }

        let axis = Vec3::new(delta.y, delta.x, 0.0).normalize();
        self.rotation = (Quat::from_axis_angle(axis, angle) * self.rotation).normalize();
    }

    pub fn process_scroll(&mut self, delta: f32) {
        self.set_zoom(self.zoom + delta * ZOOM_STEP);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn reset(&mut self, zoom: f32) {
        self.rotation = Quat::IDENTITY;
        self.set_zoom(zoom);
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub model: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_position: [f32; 4],
    pub uv_center: [f32; 2],
    pub uv_angle: f32,
    pub _padding: f32,
}

impl SceneUniform {
    pub fn new(camera: &Camera, model: Mat4, light_view: Vec3, uv_center: Vec2, uv_angle: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            projection: camera.projection_matrix().to_cols_array_2d(),
            light_position: light_view.extend(1.0).to_array(),
            uv_center: uv_center.to_array(),
            uv_angle,
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_lands_at_zoom_depth() {
        let camera = Camera::default();
        let p = camera.model_matrix().transform_point3(Vec3::ZERO);
        assert_abs_diff_eq!(p, Vec3::new(0.0, 0.0, -10.0), epsilon = 1e-6);
    }

    #[test]
    fn zoom_steps_and_clamps() {
        let mut camera = Camera::default();
        camera.zoom_in();
        assert_eq!(camera.zoom, -9.0);
        camera.zoom_out();
        camera.zoom_out();
        assert_eq!(camera.zoom, -11.0);

        camera.process_scroll(100.0);
        assert_eq!(camera.zoom, ZOOM_MAX);
        camera.process_scroll(-1000.0);
        assert_eq!(camera.zoom, ZOOM_MIN);
        assert_eq!(Camera::with_zoom(5.0).zoom, ZOOM_MAX);
    }

    #[test]
    fn reset_restores_orientation_and_zoom() {
        let mut camera = Camera::default();
        camera.process_drag(Vec2::new(30.0, 12.0));
        camera.zoom_in();
        camera.reset(-10.0);
        assert_eq!(camera.rotation, Quat::IDENTITY);
        assert_eq!(camera.zoom, -10.0);
    }

    #[test]
    fn zero_drag_keeps_rotation() {
        let mut camera = Camera::default();
        camera.process_drag(Vec2::ZERO);
        assert_eq!(camera.rotation, Quat::IDENTITY);
    }

    #[test]
    fn drag_preserves_distances() {
        let mut camera = Camera::default();
        camera.process_drag(Vec2::new(40.0, -25.0));
        assert!(camera.rotation.is_normalized());

        let p = camera.model_matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        let origin = camera.model_matrix().transform_point3(Vec3::ZERO);
        assert!(((p - origin).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn light_follows_model_transform() {
        let mut camera = Camera::default();
        camera.process_drag(Vec2::new(10.0, 3.0));
        let light = Vec3::new(0.0, 2.0, 0.0);
        let direct = camera.model_matrix().transform_point3(light);
        let placed = camera.model_matrix_at(light).transform_point3(Vec3::ZERO);
        assert_abs_diff_eq!(direct, placed, epsilon = 1e-5);
    }

    #[test]
    fn uniform_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
    }
}
