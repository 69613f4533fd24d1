//! Logical quad topology derived from the triangle index buffer.

pub mod cache;
pub mod quad_edges;
pub mod quads;

pub use cache::TopologyCache;
pub use quad_edges::{QuadEdge, QuadEdgeGraph};
pub use quads::{reconstruct_quads, Quad, DEFAULT_COPLANAR_THRESHOLD};
