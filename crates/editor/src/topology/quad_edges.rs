//! Quad perimeter edges and their owning quads.
//!
//! Only the four perimeter edges of each reconstructed quad are recorded.
//! The hidden triangulation diagonal never appears here, which is what lets
//! edge selection and loop insertion work on the logical quad mesh.

use std::collections::HashMap;

use super::quads::Quad;
use crate::mesh::VertexId;

/// One perimeter edge of the quad mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadEdge {
    /// Start vertex, in the winding of the first owner
    pub v0: VertexId,
    /// End vertex, in the winding of the first owner
    pub v1: VertexId,
    /// Owning quads (1 = boundary, 2 = interior)
    pub quads: Vec<usize>,
    /// Slot of this edge within the first owner (0-3)
    pub slot: usize,
}

impl QuadEdge {
    pub fn owner_count(&self) -> usize {
        self.quads.len()
    }

    pub fn is_boundary(&self) -> bool {
        self.quads.len() == 1
    }

    pub fn is_interior(&self) -> bool {
        self.quads.len() == 2
    }
}

/// Edge table for a quad list, keyed by endpoint-index pair.
#[derive(Debug, Clone, Default)]
pub struct QuadEdgeGraph {
    edges: Vec<QuadEdge>,
    lookup: HashMap<(VertexId, VertexId), usize>,
    /// Edge id per quad slot
    by_quad: Vec<[usize; 4]>,
}

fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b { (a, b) } else { (b, a) }
}

impl QuadEdgeGraph {
    /// Build the edge table for `quads`.
    pub fn build(quads: &[Quad]) -> Self {
        let mut graph = Self {
            edges: Vec::with_capacity(quads.len() * 2),
            lookup: HashMap::with_capacity(quads.len() * 2),
            by_quad: Vec::with_capacity(quads.len()),
        };

        for (q, quad) in quads.iter().enumerate() {
            let mut ids = [0usize; 4];
            for (slot, id) in ids.iter_mut().enumerate() {
                let a = quad[slot];
                let b = quad[(slot + 1) % 4];
                *id = match graph.lookup.get(&edge_key(a, b)) {
                    Some(&existing) => {
                        graph.edges[existing].quads.push(q);
                        existing
                    }
                    None => {
                        let new_id = graph.edges.len();
                        graph.edges.push(QuadEdge {
                            v0: a,
                            v1: b,
                            quads: vec![q],
                            slot,
                        });
                        graph.lookup.insert(edge_key(a, b), new_id);
                        new_id
                    }
                };
            }
            graph.by_quad.push(ids);
        }

        let over_shared = graph.edges.iter().filter(|e| e.owner_count() > 2).count();
        if over_shared > 0 {
            tracing::debug!(over_shared, "Quad edges with more than two owners");
        }

        graph
    }

    pub fn edges(&self) -> &[QuadEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn get(&self, edge: usize) -> Option<&QuadEdge> {
        self.edges.get(edge)
    }

    /// Edge id between two vertices, in either direction
    pub fn find(&self, a: VertexId, b: VertexId) -> Option<usize> {
        self.lookup.get(&edge_key(a, b)).copied()
    }

    /// The four edge ids of quad `q`, by slot
    pub fn quad_edges(&self, q: usize) -> Option<[usize; 4]> {
        self.by_quad.get(q).copied()
    }

    /// Local slot of `edge` within quad `q`
    pub fn slot_of(&self, edge: usize, q: usize) -> Option<usize> {
        self.by_quad.get(q)?.iter().position(|&e| e == edge)
    }

    pub fn boundary_edges(&self) -> impl Iterator<Item = &QuadEdge> {
        self.edges.iter().filter(|e| e.is_boundary())
    }
}
