use std::collections::HashSet;

use glam::Vec3;

use crate::mesh::{position_of, triangle_normal, MeshData, VertexId};

/// Recompute the normals of `affected` from the triangles that use them.
/// Vertices without a non-degenerate triangle keep their old normal.
/// Returns how many normals were rewritten.
pub fn recalculate_normals(mesh: &mut MeshData, affected: &[VertexId]) -> usize {
    let wanted: HashSet<VertexId> = affected
        .iter()
        .copied()
        .filter(|&v| (v as usize) < mesh.vertex_count())
        .collect();
    if wanted.is_empty() {
        return 0;
    }

    let mut sums = vec![Vec3::ZERO; mesh.vertex_count()];
    for tri in mesh.triangles() {
        if !tri.iter().any(|v| wanted.contains(v)) {
            continue;
        }
        if tri.iter().any(|&v| v as usize >= sums.len()) {
            continue;
        }
        let n = triangle_normal(
            position_of(mesh, tri[0]),
            position_of(mesh, tri[1]),
            position_of(mesh, tri[2]),
        );
        for v in tri {
            sums[v as usize] += n;
        }
    }

    let mut updated = 0;
    for &v in &wanted {
        if let Some(n) = sums[v as usize].try_normalize() {
            mesh.vertices[v as usize].normal = n.to_array();
            updated += 1;
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives::grid;

    #[test]
    fn test_flat_grid_normals_point_up() {
        let mut mesh = grid(2, 2, 1.0);
        for v in &mut mesh.vertices {
            v.normal = [1.0, 0.0, 0.0];
        }
        let all: Vec<VertexId> = (0..mesh.vertex_count() as u32).collect();
        assert_eq!(recalculate_normals(&mut mesh, &all), 9);
        for v in &mesh.vertices {
            assert!((Vec3::from_array(v.normal) - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_only_affected_vertices_change() {
        let mut mesh = grid(1, 1, 1.0);
        for v in &mut mesh.vertices {
            v.normal = [0.0, 1.0, 0.0];
        }
        recalculate_normals(&mut mesh, &[0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices[1].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_isolated_vertex_keeps_normal() {
        let mut mesh = grid(1, 1, 1.0);
        mesh.vertices.push(shared::Vertex::new([5.0; 3], [1.0, 0.0, 0.0], [0.0; 2]));
        assert_eq!(recalculate_normals(&mut mesh, &[4, 99]), 0);
        assert_eq!(mesh.vertices[4].normal, [1.0, 0.0, 0.0]);
    }
}
