//! Quad reconstruction from a triangle soup.
//!
//! Pairs each triangle with an adjacent, nearly coplanar triangle and merges
//! the pair into one logical quad. Triangles that find no partner stay plain
//! triangles and cannot be picked in quad mode.

use std::cmp::Ordering;
use std::collections::HashMap;

use glam::Vec3;

use crate::mesh::{position_of, triangle_normal, MeshData, VertexId};

/// Four vertex indices in perimeter (winding) order.
/// Slot `i` is the edge `quad[i] -> quad[(i + 1) % 4]`; slots 0 and 2 bound
/// the triangulation diagonal `quad[0] - quad[2]`.
pub type Quad = [VertexId; 4];

/// Minimum dot product between face normals for two triangles to merge.
pub const DEFAULT_COPLANAR_THRESHOLD: f32 = 0.95;

fn sorted_pair(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b { (a, b) } else { (b, a) }
}

/// Rebuild the quad list for `mesh`.
///
/// Each triangle tries its edges longest-first, so the split diagonal of a
/// rectangle is preferred over a coplanar neighbor across a real quad edge.
/// On an edge shared by more than two triangles the first coplanar candidate
/// wins and the rest stay unpaired.
pub fn reconstruct_quads(mesh: &MeshData, coplanar_threshold: f32) -> Vec<Quad> {
    let tris: Vec<[VertexId; 3]> = mesh.triangles().collect();
    let corners: Vec<[Vec3; 3]> = tris
        .iter()
        .map(|t| {
            [
                position_of(mesh, t[0]),
                position_of(mesh, t[1]),
                position_of(mesh, t[2]),
            ]
        })
        .collect();
    let normals: Vec<Vec3> = corners
        .iter()
        .map(|p| triangle_normal(p[0], p[1], p[2]))
        .collect();

    let mut edge_faces: HashMap<(VertexId, VertexId), Vec<usize>> = HashMap::new();
    for (t, tri) in tris.iter().enumerate() {
        for k in 0..3 {
            edge_faces
                .entry(sorted_pair(tri[k], tri[(k + 1) % 3]))
                .or_default()
                .push(t);
        }
    }

    let mut visited = vec![false; tris.len()];
    let mut quads = Vec::with_capacity(tris.len() / 2);
    let mut non_manifold = 0usize;

    for t in 0..tris.len() {
        if visited[t] {
            continue;
        }
        let tri = tris[t];
        let p = corners[t];

        let lengths = [
            (p[1] - p[0]).length_squared(),
            (p[2] - p[1]).length_squared(),
            (p[0] - p[2]).length_squared(),
        ];
        let mut order = [0usize, 1, 2];
        order.sort_by(|x, y| lengths[*y].partial_cmp(&lengths[*x]).unwrap_or(Ordering::Equal));

        let mut pairing = None;
        for k in order {
            let Some(faces) = edge_faces.get(&sorted_pair(tri[k], tri[(k + 1) % 3])) else {
                continue;
            };
            if faces.len() > 2 {
                non_manifold += 1;
            }
            let partner = faces.iter().copied().find(|&f| {
                f != t && !visited[f] && normals[t].dot(normals[f]) > coplanar_threshold
            });
            if let Some(f) = partner {
                pairing = Some((k, f));
                break;
            }
        }

        let Some((k, f)) = pairing else { continue };
        let a = tri[k];
        let b = tri[(k + 1) % 3];
        let c = tri[(k + 2) % 3];
        let Some(&d) = tris[f].iter().find(|&&v| v != a && v != b) else {
            continue;
        };

        visited[t] = true;
        visited[f] = true;
        quads.push([a, d, b, c]);
    }

    let unpaired = visited.iter().filter(|v| !**v).count();
    tracing::debug!(
        quads = quads.len(),
        unpaired,
        non_manifold,
        "Reconstructed quads"
    );

    quads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives::{cube, grid};
    use crate::mesh::Vertex;

    #[test]
    fn test_single_quad() {
        let mesh = grid(1, 1, 1.0);
        let quads = reconstruct_quads(&mesh, DEFAULT_COPLANAR_THRESHOLD);
        assert_eq!(quads, vec![[3, 2, 0, 1]]);
    }

    #[test]
    fn test_grid_quads_follow_cells() {
        let mesh = grid(2, 2, 1.0);
        let quads = reconstruct_quads(&mesh, DEFAULT_COPLANAR_THRESHOLD);
        assert_eq!(quads.len(), 4);
        // cell (0, 0): a=0, b=1, c=4, d=3 -> [c, d, a, b]
        assert_eq!(quads[0], [4, 3, 0, 1]);
    }

    #[test]
    fn test_reconstruction_is_idempotent() {
        let mesh = grid(3, 2, 1.0);
        let first = reconstruct_quads(&mesh, DEFAULT_COPLANAR_THRESHOLD);
        let second = reconstruct_quads(&mesh, DEFAULT_COPLANAR_THRESHOLD);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cube_has_six_quads() {
        let quads = reconstruct_quads(&cube(1.0), DEFAULT_COPLANAR_THRESHOLD);
        assert_eq!(quads.len(), 6);
    }

    #[test]
    fn test_folded_pair_is_not_merged() {
        let mesh = MeshData::new(
            vec![
                Vertex::at([0.0, 0.0, 0.0]),
                Vertex::at([1.0, 0.0, 0.0]),
                Vertex::at([1.0, 1.0, 0.0]),
                Vertex::at([0.0, 0.0, 1.0]),
            ],
            // second triangle stands at 90 degrees on edge 0-2
            vec![0, 1, 2, 0, 2, 3],
        );
        assert!(reconstruct_quads(&mesh, DEFAULT_COPLANAR_THRESHOLD).is_empty());
    }

    #[test]
    fn test_non_manifold_edge_pairs_first_match_only() {
        let mesh = MeshData::new(
            vec![
                Vertex::at([0.0, 0.0, 0.0]),
                Vertex::at([1.0, 0.0, 0.0]),
                Vertex::at([1.0, 1.0, 0.0]),
                Vertex::at([0.0, 1.0, 0.0]),
                Vertex::at([2.0, 0.0, 0.0]),
            ],
            vec![0, 1, 2, 0, 2, 3, 2, 0, 4],
        );
        let quads = reconstruct_quads(&mesh, DEFAULT_COPLANAR_THRESHOLD);
        assert_eq!(quads, vec![[2, 3, 0, 1]]);
    }

    #[test]
    fn test_lone_triangle_stays_unpaired() {
        let mesh = MeshData::new(
            vec![
                Vertex::at([0.0, 0.0, 0.0]),
                Vertex::at([1.0, 0.0, 0.0]),
                Vertex::at([0.0, 1.0, 0.0]),
            ],
            vec![0, 1, 2],
        );
        assert!(reconstruct_quads(&mesh, DEFAULT_COPLANAR_THRESHOLD).is_empty());
    }
}
