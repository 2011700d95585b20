use glam::Vec2;

use crate::config::AppConfig;
use crate::math::uv::rotate_uv;
use crate::scene::{SceneParams, ViewMode};

/// Counters shown in the STATISTICS section.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    pub fps: f32,
    pub vertices: u32,
    pub indices: u32,
    pub zoom: f32,
    /// Steps of the mesh currently generated, as `(circles, segments)`.
    pub grid: Option<(u32, u32)>,
}

pub struct UiState {
    pub params: SceneParams,
    pub vsync_enabled: bool,
    pub show_help: bool,
    pub show_stats: bool,

    /// Cursor position in UV-view coordinates while it hovers the viewport.
    pub hover_uv: Option<Vec2>,
}

impl UiState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            params: SceneParams::from_config(config),
            vsync_enabled: config.window.vsync,
            show_help: true,
            show_stats: true,
            hover_uv: None,
        }
    }

    pub fn is_uv_view(&self) -> bool {
        self.params.view_mode == ViewMode::Uv
    }

    /// Undoes the texture rotation at the hovered point, giving the mesh UV
    /// whose rotated line passes under the cursor.
    pub fn hover_mesh_uv(&self) -> Option<Vec2> {
        self.hover_uv
            .map(|uv| rotate_uv(uv, self.params.uv_center, -self.params.angle_rad()))
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn starts_in_surface_view_with_config_values() {
        let mut config = AppConfig::default();
        config.mesh.circle_count = 12;
        config.window.vsync = false;

        let state = UiState::from_config(&config);
        assert_eq!(state.params.circle_count, 12);
        assert!(!state.vsync_enabled);
        assert!(!state.is_uv_view());
        assert!(state.hover_uv.is_none());
        assert!(state.hover_mesh_uv().is_none());
    }

    #[test]
    fn hover_mesh_uv_inverts_rotation() {
        let mut state = UiState::default();
        state.params.uv_center = Vec2::splat(0.5);
        state.params.angle_deg = 90.0;
        state.hover_uv = Some(Vec2::new(0.5, 1.0));

        let mesh_uv = state.hover_mesh_uv().unwrap();
        assert_abs_diff_eq!(mesh_uv, Vec2::new(1.0, 0.5), epsilon = 1e-6);
        assert_abs_diff_eq!(
            rotate_uv(mesh_uv, state.params.uv_center, state.params.angle_rad()),
            Vec2::new(0.5, 1.0),
            epsilon = 1e-6
        );
    }
}
