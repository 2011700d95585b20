use crate::math::mesh::Resolution;

/// Expands a triangle list into a line list of its edges.
pub fn triangles_to_lines(indices: &[u32]) -> Vec<u32> {
    let mut lines = Vec::with_capacity(indices.len() * 2);
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        lines.extend_from_slice(&[a, b, b, c, c, a]);
    }
    lines
}

/// Line-list indices for the parameter grid: one polyline per ring (constant
/// radius) and one per spoke (constant angle), over the row-major vertex grid.
pub fn grid_lines(resolution: Resolution) -> Vec<u32> {
    let u_steps = resolution.u_steps();
    let v_steps = resolution.v_steps();
    let segments = (u_steps + 1) * v_steps + (v_steps + 1) * u_steps;
    let mut lines = Vec::with_capacity(segments as usize * 2);

    for i in 0..=u_steps {
        for j in 0..v_steps {
            lines.push(resolution.vertex_index(i, j));
            lines.push(resolution.vertex_index(i, j + 1));
        }
    }

    for j in 0..=v_steps {
        for i in 0..u_steps {
            lines.push(resolution.vertex_index(i, j));
            lines.push(resolution.vertex_index(i + 1, j));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mesh::grid_triangle_indices;

    #[test]
    fn each_triangle_becomes_three_edges() {
        let lines = triangles_to_lines(&[0, 3, 4, 0, 4, 1]);
        assert_eq!(lines, vec![0, 3, 3, 4, 4, 0, 0, 4, 4, 1, 1, 0]);
    }

    #[test]
    fn trailing_partial_triangle_is_ignored() {
        assert_eq!(triangles_to_lines(&[1, 2]).len(), 0);
    }

    #[test]
    fn uv_layout_has_twice_the_triangle_indices() {
        let res = Resolution::new(4, 6).unwrap();
        let lines = triangles_to_lines(&grid_triangle_indices(res));
        assert_eq!(lines.len(), res.index_count() * 2);
    }

    #[test]
    fn grid_lines_cover_rings_and_spokes() {
        let res = Resolution::new(2, 3).unwrap();
        let lines = grid_lines(res);
        assert_eq!(lines.len(), ((3 * 3 + 4 * 2) * 2) as usize);
        assert_eq!(&lines[..2], &[0, 1]);
        // First spoke segment starts after the ring segments.
        let spokes = (3 * 3 * 2) as usize;
        assert_eq!(&lines[spokes..spokes + 2], &[0, 4]);
        assert!(lines.iter().all(|&i| (i as usize) < res.vertex_count()));
    }
}
