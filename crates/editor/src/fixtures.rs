//! Factory functions for creating test meshes.
//!
//! Besides the primitives, these cover the awkward inputs an importer
//! produces: split vertices along seams, folded triangle pairs, edges with
//! more than two owners.

use shared::{EditScript, MeshData, Primitive, Vertex};

use crate::mesh::primitives;

// ── Clean meshes ────────────────────────────────────────────────

/// Flat grid of unit cells with shared vertices.
pub fn grid(columns: u32, rows: u32) -> MeshData {
    primitives::grid(columns, rows, 1.0)
}

/// Cube with per-face vertices (24 records, 8 positions).
pub fn cube(size: f32) -> MeshData {
    primitives::cube(size)
}

// ── Importer artifacts ──────────────────────────────────────────

/// Grid where every triangle owns its three vertex records, as after a
/// flat-shaded OBJ export. Index sharing is gone; positions still match.
pub fn unwelded_grid(columns: u32, rows: u32) -> MeshData {
    let shared = grid(columns, rows);
    let mut vertices = Vec::with_capacity(shared.indices.len());
    let mut indices = Vec::with_capacity(shared.indices.len());
    for &i in &shared.indices {
        indices.push(vertices.len() as u32);
        vertices.push(shared.vertices[i as usize]);
    }
    MeshData::new(vertices, indices)
}

/// Two triangles sharing an edge at a right angle (not a quad).
pub fn folded_pair() -> MeshData {
    MeshData::new(
        vec![
            Vertex::at([0.0, 0.0, 0.0]),
            Vertex::at([1.0, 0.0, 0.0]),
            Vertex::at([0.0, 1.0, 0.0]),
            Vertex::at([0.0, 0.0, 1.0]),
        ],
        vec![0, 1, 2, 1, 0, 3],
    )
}

/// Three coplanar triangles hanging off the edge 0-1.
pub fn non_manifold_fan() -> MeshData {
    MeshData::new(
        vec![
            Vertex::at([0.0, 0.0, 0.0]),
            Vertex::at([1.0, 0.0, 0.0]),
            Vertex::at([1.0, 1.0, 0.0]),
            Vertex::at([0.0, -1.0, 0.0]),
            Vertex::at([0.5, 2.0, 0.0]),
        ],
        vec![0, 1, 2, 1, 0, 3, 0, 1, 4],
    )
}

// ── Scripts ─────────────────────────────────────────────────────

/// Script that starts from `primitive` and runs `commands` (JSON values).
pub fn script(primitive: Primitive, commands: Vec<serde_json::Value>) -> EditScript {
    EditScript {
        mesh: None,
        primitive: Some(primitive),
        commands,
    }
}

/// Loop insertion on a 2x2 grid, seeded at quad edge 0 (vertices 3 and 4).
pub fn grid_loop_script() -> EditScript {
    script(
        Primitive::Grid {
            columns: 2,
            rows: 2,
            cell_size: 1.0,
        },
        vec![
            serde_json::json!({"command": "set_mode", "mode": "edge"}),
            serde_json::json!({"command": "select", "id": 0}),
            serde_json::json!({"command": "insert_loop"}),
            serde_json::json!({"command": "inspect"}),
        ],
    )
}
