//! Quad extrusion.
//!
//! `begin` replaces the quad's two triangles with a capped tube: four new
//! corner vertices (starting at the old positions), eight side-wall
//! triangles and two cap triangles. The new corners then follow the gizmo
//! by index until `end`.

use glam::Vec3;
use shared::GizmoAxis;

use crate::error::{EditError, Result};
use crate::mesh::{position_of, quad_normal, MeshData, VertexId};
use crate::state::UndoStack;
use crate::topology::Quad;

/// An extrusion in progress
#[derive(Debug, Clone, PartialEq)]
pub struct Extrusion {
    /// Corners of the extruded quad (left in place as the tube's base)
    pub source: Quad,
    /// The four new corners; the drag set
    pub cap: [VertexId; 4],
    /// Face normal of the source quad
    pub normal: Vec3,
}

/// Rewrite `quad` into an extruded tube of zero height. Does not touch
/// history.
pub fn extrude_quad(mesh: &mut MeshData, quad: Quad) -> Extrusion {
    let corners = quad.map(|v| position_of(mesh, v));
    let normal = quad_normal(corners).normalize_or_zero();

    // Remove the quad's own triangles
    let before = mesh.triangle_count();
    let kept: Vec<VertexId> = mesh
        .triangles()
        .filter(|tri| !tri.iter().all(|v| quad.contains(v)))
        .flatten()
        .collect();
    mesh.indices = kept;
    let removed = before - mesh.triangle_count();
    if removed != 2 {
        tracing::debug!(removed, "Extruded quad did not own exactly two triangles");
    }

    let first = mesh.vertices.len() as VertexId;
    for &v in &quad {
        let mut copy = mesh.vertices[v as usize];
        copy.normal = normal.to_array();
        mesh.vertices.push(copy);
    }
    let cap = [first, first + 1, first + 2, first + 3];

    // Side walls: one strip quad per perimeter edge, winding outward
    for i in 0..4 {
        let j = (i + 1) % 4;
        let (c0, c1) = (quad[i], quad[j]);
        let (n0, n1) = (cap[i], cap[j]);
        mesh.indices.extend_from_slice(&[c0, c1, n1, c0, n1, n0]);
    }

    // Cap
    mesh.indices
        .extend_from_slice(&[cap[0], cap[1], cap[2], cap[0], cap[2], cap[3]]);

    Extrusion {
        source: quad,
        cap,
        normal,
    }
}

/// Tracks at most one extrusion across a drag
#[derive(Debug, Default)]
pub struct Extruder {
    active: Option<Extrusion>,
}

impl Extruder {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Extrusion> {
        self.active.as_ref()
    }

    /// Start extruding quad `quad_id`. Pushes one undo snapshot on success.
    pub fn begin(
        &mut self,
        mesh: &mut MeshData,
        quads: &[Quad],
        quad_id: usize,
        history: &mut UndoStack,
    ) -> Result<&Extrusion> {
        if self.active.is_some() {
            return Err(EditError::ExtrusionInProgress);
        }
        let quad = *quads.get(quad_id).ok_or_else(|| {
            EditError::selection(format!("quad {quad_id} does not exist ({} quads)", quads.len()))
        })?;
        if quad.iter().any(|&v| v as usize >= mesh.vertex_count()) {
            return Err(EditError::selection(format!("quad {quad_id} is stale")));
        }

        history.push(mesh);
        let extrusion = extrude_quad(mesh, quad);
        tracing::info!(quad = quad_id, cap = ?extrusion.cap, "Began extrusion");
        let active = self.active.insert(extrusion);
        Ok(&*active)
    }

    /// Offset the cap corners by index. Without an axis the cap moves along
    /// the face normal. Returns the number of vertices moved.
    pub fn apply_delta(&self, mesh: &mut MeshData, axis: Option<GizmoAxis>, amount: f32) -> usize {
        let Some(extrusion) = &self.active else {
            return 0;
        };
        let offset = match axis {
            Some(axis) => {
                let mut v = Vec3::ZERO;
                v[axis.index()] = amount;
                v
            }
            None => extrusion.normal * amount,
        };

        let mut moved = 0;
        for &v in &extrusion.cap {
            if let Some(vertex) = mesh.vertices.get_mut(v as usize) {
                let p = Vec3::from_array(vertex.position) + offset;
                vertex.position = p.to_array();
                moved += 1;
            }
        }
        moved
    }

    pub fn end(&mut self) -> Option<Extrusion> {
        let finished = self.active.take();
        if let Some(extrusion) = &finished {
            tracing::info!(cap = ?extrusion.cap, "Finished extrusion");
        }
        finished
    }
}
