//! Mesh validation utilities.
//!
//! `MeshValidator` checks mesh data integrity: index stride, in-range
//! indices, unit normals, degenerate triangles, AABB dimensions.

use glam::Vec3;

use crate::mesh::position_key::same;
use crate::mesh::{position, position_of, MeshData, PositionIndex};

/// Validator for `MeshData` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    /// Create a new validator for the given mesh.
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Check that the index buffer length is a multiple of 3.
    pub fn is_index_stride_valid(&self) -> bool {
        self.mesh.indices.len() % 3 == 0
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.vertex_count() as u32;
        self.mesh.indices.iter().all(|&i| i < max_idx)
    }

    /// Check that all vertex normals have unit length (within epsilon).
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        self.mesh
            .vertices
            .iter()
            .all(|v| (Vec3::from_array(v.normal).length() - 1.0).abs() <= epsilon)
    }

    /// Triangles with (near) zero area. Indices must be in range.
    pub fn degenerate_triangles(&self) -> Vec<usize> {
        if !self.are_indices_in_range() {
            return Vec::new();
        }
        self.mesh
            .triangles()
            .enumerate()
            .filter(|(_, t)| {
                let p = t.map(|v| position_of(self.mesh, v));
                same(p[0], p[1])
                    || same(p[1], p[2])
                    || same(p[2], p[0])
                    || (p[1] - p[0]).cross(p[2] - p[0]).length_squared() < 1e-12
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Vertex records sharing a position with an earlier one
    pub fn duplicate_vertex_count(&self) -> usize {
        let index = PositionIndex::build(&self.mesh.vertices);
        index.len() - index.distinct_positions()
    }

    /// Axis-aligned bounds as (min, max). None for an empty mesh.
    pub fn aabb(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.mesh.vertices.iter().map(position);
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Compute the dimensions (width, height, depth) of the bounding box.
    pub fn dimensions(&self) -> [f32; 3] {
        self.aabb()
            .map(|(lo, hi)| (hi - lo).to_array())
            .unwrap_or([0.0; 3])
    }

    /// Check that the AABB dimensions are approximately equal to `expected`.
    pub fn assert_dimensions_approx(&self, expected: [f32; 3], tolerance: f32) -> bool {
        let dims = self.dimensions();
        (dims[0] - expected[0]).abs() < tolerance
            && (dims[1] - expected[1]).abs() < tolerance
            && (dims[2] - expected[2]).abs() < tolerance
    }

    /// Problems that make the mesh unusable for editing.
    pub fn structural_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.is_index_stride_valid() {
            errors.push(format!(
                "Index buffer length {} is not a multiple of 3",
                self.mesh.indices.len()
            ));
        }

        if !self.are_indices_in_range() {
            let max_idx = self.vertex_count() as u32;
            let out_of_range: Vec<_> = self
                .mesh
                .indices
                .iter()
                .filter(|&&i| i >= max_idx)
                .take(5)
                .collect();
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                max_idx, out_of_range
            ));
        }

        errors
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = self.structural_errors();

        if self.vertex_count() > 0 && !self.are_normals_normalized(0.1) {
            errors.push("Some normals are not unit-length (epsilon=0.1)".to_string());
        }

        let degenerate = self.degenerate_triangles();
        if !degenerate.is_empty() {
            errors.push(format!(
                "{} degenerate triangles (first: {:?})",
                degenerate.len(),
                &degenerate[..degenerate.len().min(5)]
            ));
        }

        errors
    }
}
