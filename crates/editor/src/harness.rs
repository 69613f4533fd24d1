//! Headless test harness for programmatic mesh editing.
//!
//! Wraps a [`MeshEditorSession`] with a recording buffer sink so tests and
//! the script runner can see every re-upload the session asks for.

use std::cell::RefCell;
use std::rc::Rc;

use shared::{GizmoAxis, GizmoOp, MeshData, Primitive, SelectionMode, Vertex, VertexId};

use crate::mesh::primitives;
use crate::session::{MeshBufferSink, MeshEditorSession};
use crate::state::EditorSettings;
use crate::validation::MeshValidator;

/// Sizes of one buffer re-upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUpload {
    pub vertices: usize,
    pub triangles: usize,
}

/// Shared log of uploads, readable while the session owns the sink
#[derive(Debug, Clone, Default)]
pub struct BufferLog(Rc<RefCell<Vec<BufferUpload>>>);

impl BufferLog {
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn last(&self) -> Option<BufferUpload> {
        self.0.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

struct RecordingSink(BufferLog);

impl MeshBufferSink for RecordingSink {
    fn rebuild_buffers(&mut self, vertices: &[Vertex], indices: &[VertexId]) {
        self.0 .0.borrow_mut().push(BufferUpload {
            vertices: vertices.len(),
            triangles: indices.len() / 3,
        });
    }
}

/// Headless harness: one session plus its upload log
pub struct TestHarness {
    pub session: MeshEditorSession,
    uploads: BufferLog,
}

impl TestHarness {
    /// Harness over `mesh` with default settings.
    pub fn new(mesh: MeshData) -> Self {
        Self::with_settings(mesh, EditorSettings::default())
    }

    pub fn with_settings(mesh: MeshData, settings: EditorSettings) -> Self {
        let uploads = BufferLog::default();
        let mut session = MeshEditorSession::with_settings(mesh, settings);
        session.set_buffer_sink(Box::new(RecordingSink(uploads.clone())));
        // only count uploads caused by commands
        uploads.clear();
        Self { session, uploads }
    }

    pub fn from_primitive(primitive: &Primitive) -> Self {
        Self::new(primitives::build(primitive))
    }

    /// Flat `columns` x `rows` grid of unit cells
    pub fn grid(columns: u32, rows: u32) -> Self {
        Self::new(primitives::grid(columns, rows, 1.0))
    }

    pub fn cube(size: f32) -> Self {
        Self::new(primitives::cube(size))
    }

    /// Load a mesh from JSON (`{"vertices": [...], "indices": [...]}`)
    pub fn from_mesh_json(json: &str) -> Result<Self, String> {
        let mesh: MeshData =
            serde_json::from_str(json).map_err(|e| format!("JSON parse error: {e}"))?;
        let errors = MeshValidator::new(&mesh).structural_errors();
        if !errors.is_empty() {
            return Err(errors.join("; "));
        }
        Ok(Self::new(mesh))
    }

    /// Export the current mesh as JSON
    pub fn export_mesh_json(&self) -> String {
        serde_json::to_string_pretty(self.session.mesh()).unwrap_or_default()
    }

    // ── Selection ─────────────────────────────────────────────

    /// Switch to `mode` and select `ids` (the first replaces, the rest are Ctrl-added).
    /// Returns false if any id was rejected.
    pub fn select(&mut self, mode: SelectionMode, ids: &[usize]) -> bool {
        self.session.set_mode(mode);
        self.session.clear_selection();
        let mut all = true;
        for (i, &id) in ids.iter().enumerate() {
            all &= self.session.toggle_selection(id, i > 0);
        }
        all
    }

    /// Select the quad edge between vertices `a` and `b`
    pub fn select_edge_between(&mut self, a: VertexId, b: VertexId) -> bool {
        match self.session.quad_edges().find(a, b) {
            Some(edge) => self.select(SelectionMode::Edge, &[edge]),
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    // ── Editing ───────────────────────────────────────────────

    /// Insert an edge loop seeded at the edge between `a` and `b`
    pub fn insert_loop_at(&mut self, a: VertexId, b: VertexId) -> bool {
        self.select_edge_between(a, b) && self.session.insert_loop()
    }

    /// Select quad `quad` and extrude it by `distance` along its normal
    pub fn extrude_quad(&mut self, quad: usize, distance: f32) -> bool {
        if !self.select(SelectionMode::Quad, &[quad]) || !self.session.begin_extrude() {
            return false;
        }
        let ok = self.session.begin_gizmo_drag(GizmoOp::Move, None);
        if ok {
            self.session.apply_gizmo_delta(distance);
            self.session.end_gizmo_drag();
        }
        self.session.end_extrude();
        ok
    }

    /// Run a whole drag over the current selection. Returns vertex records moved
    /// per frame.
    pub fn drag(&mut self, op: GizmoOp, axis: Option<GizmoAxis>, deltas: &[f32]) -> Vec<usize> {
        if !self.session.begin_gizmo_drag(op, axis) {
            return Vec::new();
        }
        let moved = deltas
            .iter()
            .map(|&d| self.session.apply_gizmo_delta(d))
            .collect();
        self.session.end_gizmo_drag();
        moved
    }

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.session.vertices().len()
    }

    pub fn triangle_count(&self) -> usize {
        self.session.indices().len() / 3
    }

    pub fn quad_count(&mut self) -> usize {
        self.session.quads().len()
    }

    pub fn edge_count(&mut self) -> usize {
        self.session.quad_edges().len()
    }

    pub fn boundary_edge_count(&mut self) -> usize {
        self.session.quad_edges().boundary_edges().count()
    }

    pub fn mesh(&self) -> &MeshData {
        self.session.mesh()
    }

    /// Create a validator for the current mesh
    pub fn validator(&self) -> MeshValidator<'_> {
        MeshValidator::new(self.session.mesh())
    }

    /// Buffer uploads since the harness was created
    pub fn uploads(&self) -> &BufferLog {
        &self.uploads
    }
}
