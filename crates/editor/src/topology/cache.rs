//! Lazily rebuilt quad topology.

use super::quad_edges::QuadEdgeGraph;
use super::quads::{reconstruct_quads, Quad};
use crate::mesh::MeshData;

/// Cached quads and quad-edge graph, rebuilt when the topology version moves.
pub struct TopologyCache {
    quads: Vec<Quad>,
    graph: QuadEdgeGraph,
    version: u64,
    rebuild_count: u64,
}

impl Default for TopologyCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyCache {
    pub fn new() -> Self {
        Self {
            quads: Vec::new(),
            graph: QuadEdgeGraph::default(),
            version: u64::MAX, // force first rebuild
            rebuild_count: 0,
        }
    }

    /// Check if cache is still valid
    pub fn is_valid(&self, topology_version: u64) -> bool {
        self.version == topology_version
    }

    /// Rebuild if `topology_version` differs from the cached one
    pub fn ensure(&mut self, mesh: &MeshData, topology_version: u64, coplanar_threshold: f32) {
        if self.is_valid(topology_version) {
            return;
        }
        self.quads = reconstruct_quads(mesh, coplanar_threshold);
        self.graph = QuadEdgeGraph::build(&self.quads);
        self.version = topology_version;
        self.rebuild_count += 1;
        tracing::debug!(
            version = topology_version,
            quads = self.quads.len(),
            edges = self.graph.len(),
            "Rebuilt quad topology"
        );
    }

    /// Drop the cached version so the next `ensure` rebuilds
    pub fn invalidate(&mut self) {
        self.version = u64::MAX;
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn graph(&self) -> &QuadEdgeGraph {
        &self.graph
    }

    /// Rebuild counter
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }
}
