//! Mesh-rewriting operations. Each takes the mesh and the topology it needs
//! explicitly; the session decides when caches go stale.

pub mod edge_loop;
pub mod extrude;
pub mod normals;
pub mod transform;

pub use edge_loop::{collect_ring, insert_loop, LoopInsertion, RingQuad};
pub use extrude::{extrude_quad, Extruder, Extrusion};
pub use normals::recalculate_normals;
pub use transform::{apply_delta, scale_factor, transform_point, welded_vertices, TransformDelta};
