//! Primitive meshes used as starting points for editing sessions and tests.

use glam::Vec3;
use shared::Primitive;

use super::{MeshData, Vertex};

/// Build the mesh described by a [`Primitive`].
pub fn build(primitive: &Primitive) -> MeshData {
    match primitive {
        Primitive::Cube { size } => cube(*size),
        Primitive::Grid {
            columns,
            rows,
            cell_size,
        } => grid(*columns, *rows, *cell_size),
        Primitive::Quad { size } => grid(1, 1, *size),
    }
}

/// Axis-aligned cube centered at the origin. Each face owns its 4 vertices,
/// the way an OBJ importer lays them out.
pub fn cube(size: f32) -> MeshData {
    let h = size * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-h, -h, h), Vec3::new(h, -h, h), Vec3::new(h, h, h), Vec3::new(-h, h, h)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(h, -h, -h), Vec3::new(-h, -h, -h), Vec3::new(-h, h, -h), Vec3::new(h, h, -h)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(h, -h, h), Vec3::new(h, -h, -h), Vec3::new(h, h, -h), Vec3::new(h, h, h)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-h, -h, -h), Vec3::new(-h, -h, h), Vec3::new(-h, h, h), Vec3::new(-h, h, -h)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-h, h, h), Vec3::new(h, h, h), Vec3::new(h, h, -h), Vec3::new(-h, h, -h)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-h, -h, -h), Vec3::new(h, -h, -h), Vec3::new(h, -h, h), Vec3::new(-h, -h, h)], Vec3::NEG_Y),
    ];
    let corner_uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (quad, normal) in &faces {
        let base = vertices.len() as u32;
        for (p, uv) in quad.iter().zip(corner_uvs) {
            push_vert(&mut vertices, *p, *normal, uv);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Flat grid of `columns` x `rows` quads in the XY plane facing +Z.
/// Neighboring cells share vertices; vertex `(i, j)` has index `j * (columns + 1) + i`.
pub fn grid(columns: u32, rows: u32, cell_size: f32) -> MeshData {
    let mut vertices = Vec::with_capacity(((columns + 1) * (rows + 1)) as usize);
    let mut indices = Vec::with_capacity((columns * rows * 6) as usize);

    for j in 0..=rows {
        for i in 0..=columns {
            let p = Vec3::new(i as f32 * cell_size, j as f32 * cell_size, 0.0);
            let uv = [
                i as f32 / columns.max(1) as f32,
                j as f32 / rows.max(1) as f32,
            ];
            push_vert(&mut vertices, p, Vec3::Z, uv);
        }
    }

    let stride = columns + 1;
    for j in 0..rows {
        for i in 0..columns {
            let a = j * stride + i;
            let b = a + 1;
            let c = b + stride;
            let d = a + stride;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    MeshData { vertices, indices }
}

// ── Helpers ──────────────────────────────────────────────────

fn push_vert(v: &mut Vec<Vertex>, p: Vec3, n: Vec3, uv: [f32; 2]) {
    v.push(Vertex::new(p.to_array(), n.to_array(), uv));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let mesh = cube(2.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn test_grid_counts_and_layout() {
        let mesh = grid(3, 2, 0.5);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.triangle_count(), 12);
        // vertex (2, 1) -> index 1 * 4 + 2
        assert_eq!(mesh.vertices[6].position, [1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_build_quad_primitive() {
        let mesh = build(&Primitive::Quad { size: 1.0 });
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 3, 0, 3, 2]);
    }
}
