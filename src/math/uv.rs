use glam::{Mat2, Vec2};

/// Rotates a texture coordinate by `angle` radians around `center`.
pub fn rotate_uv(uv: Vec2, center: Vec2, angle: f32) -> Vec2 {
    Mat2::from_angle(angle) * (uv - center) + center
}

/// Maps a cursor position in window pixels to UV-view coordinates: `[0, 1]²`
/// with the origin at the bottom-left corner.
pub fn cursor_to_uv(cursor: Vec2, viewport: Vec2) -> Vec2 {
    let size = viewport.max(Vec2::ONE);
    let uv = Vec2::new(cursor.x / size.x, 1.0 - cursor.y / size.y);
    uv.clamp(Vec2::ZERO, Vec2::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn center_is_fixed_point() {
        let center = Vec2::new(0.3, 0.7);
        assert_abs_diff_eq!(rotate_uv(center, center, 1.234), center, epsilon = 1e-6);
    }

    #[test]
    fn quarter_turn_counter_clockwise() {
        let center = Vec2::splat(0.5);
        let rotated = rotate_uv(Vec2::new(1.0, 0.5), center, FRAC_PI_2);
        assert_abs_diff_eq!(rotated, Vec2::new(0.5, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn full_turn_is_identity() {
        let uv = Vec2::new(0.1, 0.9);
        assert_abs_diff_eq!(rotate_uv(uv, Vec2::splat(0.5), 2.0 * PI), uv, epsilon = 1e-5);
    }

    #[test]
    fn cursor_flips_y_and_clamps() {
        let viewport = Vec2::new(200.0, 100.0);
        assert_abs_diff_eq!(cursor_to_uv(Vec2::new(50.0, 25.0), viewport), Vec2::new(0.25, 0.75));
        assert_abs_diff_eq!(cursor_to_uv(Vec2::new(-10.0, 500.0), viewport), Vec2::new(0.0, 0.0));
    }
}
