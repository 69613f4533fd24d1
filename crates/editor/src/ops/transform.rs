//! Move / scale / rotate of welded selections.
//!
//! Targets are resolved to position keys first, so every vertex record that
//! shares a position with a selected corner moves with it (OBJ imports split
//! vertices along UV and normal seams).

use glam::{Quat, Vec3};
use shared::{GizmoAxis, GizmoOp};

use crate::mesh::{position_of, MeshData, PositionIndex, VertexId};

/// One frame of gizmo input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDelta {
    pub op: GizmoOp,
    pub axis: Option<GizmoAxis>,
    /// Pivot for scale and rotate
    pub centroid: Vec3,
    /// Distance (move), factor offset (scale) or radians (rotate)
    pub delta: f32,
}

fn axis_vector(axis: GizmoAxis) -> Vec3 {
    match axis {
        GizmoAxis::X => Vec3::X,
        GizmoAxis::Y => Vec3::Y,
        GizmoAxis::Z => Vec3::Z,
    }
}

/// Scale factor for a delta, clamped so geometry never inverts
pub fn scale_factor(delta: f32, min_factor: f32) -> f32 {
    (1.0 + delta).max(min_factor)
}

/// Transform a single point. `None` when the delta is a no-op
/// (move or rotate without an axis).
pub fn transform_point(p: Vec3, d: &TransformDelta, min_scale: f32) -> Option<Vec3> {
    match (d.op, d.axis) {
        (GizmoOp::Move, Some(axis)) => {
            let mut out = p;
            out[axis.index()] += d.delta;
            Some(out)
        }
        (GizmoOp::Scale, Some(axis)) => {
            let f = scale_factor(d.delta, min_scale);
            let i = axis.index();
            let mut out = p;
            out[i] = d.centroid[i] + (p[i] - d.centroid[i]) * f;
            Some(out)
        }
        (GizmoOp::Scale, None) => {
            let f = scale_factor(d.delta, min_scale);
            Some(d.centroid + (p - d.centroid) * f)
        }
        (GizmoOp::Rotate, Some(axis)) => {
            let rot = Quat::from_axis_angle(axis_vector(axis), d.delta);
            Some(d.centroid + rot * (p - d.centroid))
        }
        (GizmoOp::Move, None) | (GizmoOp::Rotate, None) => None,
    }
}

/// Every vertex welded to one of `targets`, ascending, each once.
pub fn welded_vertices(index: &PositionIndex, targets: &[VertexId]) -> Vec<VertexId> {
    index.matching(targets.iter().filter_map(|&v| index.key_of(v)))
}

/// Apply `d` to every vertex welded to `targets`. Returns how many vertex
/// records moved.
pub fn apply_delta(
    mesh: &mut MeshData,
    index: &PositionIndex,
    targets: &[VertexId],
    d: &TransformDelta,
    min_scale: f32,
) -> usize {
    if d.axis.is_none() && d.op != GizmoOp::Scale {
        tracing::debug!(op = ?d.op, "Axis-free delta ignored");
        return 0;
    }

    let mut moved = 0;
    for v in welded_vertices(index, targets) {
        if v as usize >= mesh.vertex_count() {
            continue;
        }
        if let Some(p) = transform_point(position_of(mesh, v), d, min_scale) {
            mesh.vertices[v as usize].position = p.to_array();
            moved += 1;
        }
    }
    moved
}
