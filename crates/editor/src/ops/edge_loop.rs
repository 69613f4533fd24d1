//! Edge-loop insertion across a ring of quads.
//!
//! Starting from a seed quad edge, the ring is flood-filled through the
//! edges parallel to the seed ("cut" edges). Every cut edge gets a midpoint
//! vertex and every quad in the ring is re-emitted as two sub-quads joined
//! along the new loop.

use std::collections::{HashMap, VecDeque};

use glam::Vec3;

use crate::error::{EditError, Result};
use crate::mesh::position_key::{edge_key, key, PositionKey};
use crate::mesh::{midpoint_vertex, position_of, quad_normal, triangle_normal, MeshData, VertexId};
use crate::state::UndoStack;
use crate::topology::{Quad, QuadEdgeGraph};

/// One quad of the ring and the slot through which it was entered.
/// Slots `cut` and `(cut + 2) % 4` are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingQuad {
    pub quad: usize,
    pub cut: usize,
}

/// What an insertion changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopInsertion {
    /// Quad ids (pre-insertion numbering) that were split
    pub split_quads: Vec<usize>,
    /// Midpoint vertices appended to the vertex array
    pub new_vertices: usize,
    pub removed_triangles: usize,
    pub added_triangles: usize,
}

/// Breadth-first walk from `seed_edge` through shared cut edges.
/// Each quad appears once, in visiting order.
pub fn collect_ring(quads: &[Quad], graph: &QuadEdgeGraph, seed_edge: usize) -> Vec<RingQuad> {
    let Some(seed) = graph.get(seed_edge) else {
        return Vec::new();
    };

    let mut visited = vec![false; quads.len()];
    let mut queue: VecDeque<RingQuad> = seed
        .quads
        .iter()
        .filter_map(|&q| graph.slot_of(seed_edge, q).map(|cut| RingQuad { quad: q, cut }))
        .collect();
    let mut ring = Vec::new();

    while let Some(entry) = queue.pop_front() {
        if entry.quad >= quads.len() || visited[entry.quad] {
            continue;
        }
        visited[entry.quad] = true;
        ring.push(entry);

        let Some(ids) = graph.quad_edges(entry.quad) else {
            continue;
        };
        for slot in [entry.cut, (entry.cut + 2) % 4] {
            let edge_id = ids[slot];
            let Some(edge) = graph.get(edge_id) else {
                continue;
            };
            for &next in &edge.quads {
                if next == entry.quad || next >= quads.len() || visited[next] {
                    continue;
                }
                if let Some(cut) = graph.slot_of(edge_id, next) {
                    queue.push_back(RingQuad { quad: next, cut });
                }
            }
        }
    }

    ring
}

/// Append `tri`, flipped if its normal disagrees with `reference`.
fn push_oriented(indices: &mut Vec<VertexId>, mesh: &MeshData, tri: [VertexId; 3], reference: Vec3) {
    let n = triangle_normal(
        position_of(mesh, tri[0]),
        position_of(mesh, tri[1]),
        position_of(mesh, tri[2]),
    );
    if n.dot(reference) < 0.0 {
        indices.extend_from_slice(&[tri[0], tri[2], tri[1]]);
    } else {
        indices.extend_from_slice(&tri);
    }
}

/// Insert an edge loop through the ring of quads crossed by `seed_edge`.
///
/// Pushes one undo snapshot once the seed is known to be valid. `quads` and
/// `graph` must describe the current index buffer; both are stale afterwards.
pub fn insert_loop(
    mesh: &mut MeshData,
    quads: &[Quad],
    graph: &QuadEdgeGraph,
    seed_edge: usize,
    history: &mut UndoStack,
) -> Result<LoopInsertion> {
    if graph.get(seed_edge).is_none() {
        return Err(EditError::selection(format!(
            "quad edge {seed_edge} does not exist ({} edges)",
            graph.len()
        )));
    }

    let ring = collect_ring(quads, graph, seed_edge);
    if ring.is_empty() {
        return Err(EditError::selection(format!(
            "quad edge {seed_edge} has no owning quad"
        )));
    }

    history.push(mesh);

    // Quad normals before any triangle is removed
    let reference: Vec<Vec3> = ring
        .iter()
        .map(|r| {
            let q = quads[r.quad];
            quad_normal([
                position_of(mesh, q[0]),
                position_of(mesh, q[1]),
                position_of(mesh, q[2]),
                position_of(mesh, q[3]),
            ])
        })
        .collect();

    // One midpoint per distinct cut edge, matched by endpoint position
    let first_new = mesh.vertices.len();
    let mut midpoints: HashMap<(PositionKey, PositionKey), VertexId> = HashMap::new();
    let mut ring_midpoints: Vec<[VertexId; 2]> = Vec::with_capacity(ring.len());

    for r in &ring {
        let q = quads[r.quad];
        let mut pair = [0 as VertexId; 2];
        for (out, slot) in pair.iter_mut().zip([r.cut, (r.cut + 2) % 4]) {
            let a = q[slot];
            let b = q[(slot + 1) % 4];
            let k = edge_key(key(position_of(mesh, a)), key(position_of(mesh, b)));
            *out = match midpoints.get(&k) {
                Some(&existing) => existing,
                None => {
                    let mid = midpoint_vertex(&mesh.vertices[a as usize], &mesh.vertices[b as usize]);
                    let id = mesh.vertices.len() as VertexId;
                    mesh.vertices.push(mid);
                    midpoints.insert(k, id);
                    id
                }
            };
        }
        ring_midpoints.push(pair);
    }

    // Drop every triangle whose vertices all belong to one ring quad
    let mut owners: HashMap<VertexId, Vec<usize>> = HashMap::new();
    for (i, r) in ring.iter().enumerate() {
        for &v in &quads[r.quad] {
            owners.entry(v).or_default().push(i);
        }
    }
    let is_ring_triangle = |tri: &[VertexId; 3]| {
        owners.get(&tri[0]).is_some_and(|candidates| {
            candidates.iter().any(|&i| {
                let q = &quads[ring[i].quad];
                q.contains(&tri[1]) && q.contains(&tri[2])
            })
        })
    };

    let mut indices: Vec<VertexId> = Vec::with_capacity(mesh.indices.len() + ring.len() * 6);
    let mut removed = 0usize;
    for tri in mesh.triangles() {
        if is_ring_triangle(&tri) {
            removed += 1;
        } else {
            indices.extend_from_slice(&tri);
        }
    }

    // Re-emit each ring quad as two sub-quads
    let kept_len = indices.len();
    for ((r, [m0, m1]), normal) in ring.iter().zip(&ring_midpoints).zip(&reference) {
        let q = quads[r.quad];
        let c0 = q[r.cut];
        let c1 = q[(r.cut + 1) % 4];
        let c2 = q[(r.cut + 2) % 4];
        let c3 = q[(r.cut + 3) % 4];

        for [a, b, c, d] in [[c0, *m0, *m1, c3], [*m0, c1, c2, *m1]] {
            push_oriented(&mut indices, mesh, [a, b, c], *normal);
            push_oriented(&mut indices, mesh, [a, c, d], *normal);
        }
    }
    let added = (indices.len() - kept_len) / 3;

    mesh.indices = indices;

    let report = LoopInsertion {
        split_quads: ring.iter().map(|r| r.quad).collect(),
        new_vertices: mesh.vertices.len() - first_new,
        removed_triangles: removed,
        added_triangles: added,
    };
    tracing::info!(
        quads = report.split_quads.len(),
        new_vertices = report.new_vertices,
        "Inserted edge loop"
    );
    Ok(report)
}
