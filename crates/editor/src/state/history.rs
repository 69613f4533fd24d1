//! Undo/redo functionality

use crate::error::{EditError, Result};
use crate::mesh::{MeshData, Vertex, VertexId};

/// Default number of undo levels kept
pub const DEFAULT_UNDO_CAPACITY: usize = 20;

/// Deep copy of the vertex and index arrays
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSnapshot {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<VertexId>,
}

impl MeshSnapshot {
    pub fn capture(mesh: &MeshData) -> Self {
        Self {
            vertices: mesh.vertices.clone(),
            indices: mesh.indices.clone(),
        }
    }

    pub fn into_mesh(self) -> MeshData {
        MeshData::new(self.vertices, self.indices)
    }
}

/// Bounded mesh history
#[derive(Debug)]
pub struct UndoStack {
    undo: Vec<MeshSnapshot>,
    redo: Vec<MeshSnapshot>,
    capacity: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the number of levels, dropping the oldest if needed
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        Self::trim(&mut self.undo, self.capacity);
        Self::trim(&mut self.redo, self.capacity);
    }

    /// Save current state before a mutating command commits
    pub fn push(&mut self, mesh: &MeshData) {
        self.undo.push(MeshSnapshot::capture(mesh));
        Self::trim(&mut self.undo, self.capacity);
        self.redo.clear();
    }

    /// Pop the most recent snapshot without touching the redo stack
    pub fn pop(&mut self) -> Result<MeshSnapshot> {
        self.undo.pop().ok_or(EditError::EmptyUndo)
    }

    /// Step back: returns the mesh to restore, parks `current` for redo
    pub fn undo(&mut self, current: &MeshData) -> Result<MeshData> {
        let prev = self.pop()?;
        self.redo.push(MeshSnapshot::capture(current));
        Self::trim(&mut self.redo, self.capacity);
        Ok(prev.into_mesh())
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: &MeshData) -> Result<MeshData> {
        let next = self.redo.pop().ok_or(EditError::EmptyRedo)?;
        self.undo.push(MeshSnapshot::capture(current));
        Self::trim(&mut self.undo, self.capacity);
        Ok(next.into_mesh())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn trim(stack: &mut Vec<MeshSnapshot>, capacity: usize) {
        if stack.len() > capacity {
            let excess = stack.len() - capacity;
            stack.drain(..excess);
        }
    }
}
