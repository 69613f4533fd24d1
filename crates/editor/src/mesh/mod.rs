//! Mesh data and small geometric helpers shared by the editing operations.

pub mod position_key;
pub mod primitives;

use glam::{Vec2, Vec3};

pub use position_key::{PositionIndex, PositionKey};
pub use shared::{MeshData, Vertex, VertexId};

/// Position of a vertex as a `Vec3`.
pub fn position(v: &Vertex) -> Vec3 {
    Vec3::from(v.position)
}

/// Position of vertex `i` in `mesh`.
pub fn position_of(mesh: &MeshData, i: VertexId) -> Vec3 {
    position(&mesh.vertices[i as usize])
}

/// Unit normal of a triangle from its winding (zero for degenerate triangles).
pub fn triangle_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p1 - p0).cross(p2 - p0).normalize_or_zero()
}

/// Unit normal of a quad from the cross product of its diagonals.
pub fn quad_normal(p: [Vec3; 4]) -> Vec3 {
    (p[2] - p[0]).cross(p[3] - p[1]).normalize_or_zero()
}

/// New vertex halfway between `a` and `b` (normal renormalized).
pub fn midpoint_vertex(a: &Vertex, b: &Vertex) -> Vertex {
    let pos = (position(a) + position(b)) * 0.5;
    let n = (Vec3::from(a.normal) + Vec3::from(b.normal)).normalize_or_zero();
    let uv = (Vec2::from(a.uv) + Vec2::from(b.uv)) * 0.5;
    Vertex::new(pos.to_array(), n.to_array(), uv.to_array())
}
