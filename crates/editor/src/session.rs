//! Editing session: the single owner of the mesh and everything derived
//! from it.
//!
//! Command entry points never fail loudly. A rejected command is logged with
//! `tracing::warn!` and reported as `false` / `None` / `0`; the mesh is left
//! untouched.

use glam::Vec3;
use shared::{GizmoAxis, GizmoOp, SelectionMode};

use crate::error::{EditError, Result};
use crate::mesh::{position_of, MeshData, PositionIndex, Vertex, VertexId};
use crate::ops::{self, Extruder, TransformDelta};
use crate::state::{EditorSettings, GizmoState, SelectionSet, SelectionState, UndoStack};
use crate::topology::{Quad, QuadEdgeGraph, TopologyCache};
use crate::validation::MeshValidator;

/// Provides the initial mesh (file importer, primitive generator, ...)
pub trait MeshSource {
    fn load_mesh(&mut self) -> std::result::Result<MeshData, String>;
}

impl MeshSource for MeshData {
    fn load_mesh(&mut self) -> std::result::Result<MeshData, String> {
        Ok(self.clone())
    }
}

/// Receives the full vertex and index arrays after every committed change
pub trait MeshBufferSink {
    fn rebuild_buffers(&mut self, vertices: &[Vertex], indices: &[VertexId]);
}

pub struct MeshEditorSession {
    mesh: MeshData,
    selection: SelectionState,
    topology: TopologyCache,
    /// Bumped whenever the index array changes
    topology_version: u64,
    /// Bumped whenever any vertex position changes
    geometry_version: u64,
    position_index: PositionIndex,
    /// Geometry version the position index was built for
    position_index_version: u64,
    history: UndoStack,
    gizmo: GizmoState,
    extruder: Extruder,
    settings: EditorSettings,
    sink: Option<Box<dyn MeshBufferSink>>,
}

impl MeshEditorSession {
    /// Wrap an already validated mesh. Indices must be in range; use
    /// [`MeshEditorSession::from_source`] for untrusted input.
    pub fn new(mesh: MeshData) -> Self {
        Self::with_settings(mesh, EditorSettings::default())
    }

    pub fn with_settings(mesh: MeshData, settings: EditorSettings) -> Self {
        Self {
            mesh,
            selection: SelectionState::default(),
            topology: TopologyCache::new(),
            topology_version: 0,
            geometry_version: 0,
            position_index: PositionIndex::default(),
            position_index_version: u64::MAX,
            history: UndoStack::new(settings.undo_capacity),
            gizmo: GizmoState::default(),
            extruder: Extruder::default(),
            settings,
            sink: None,
        }
    }

    /// Load and validate a mesh from `source`.
    pub fn from_source(source: &mut dyn MeshSource, settings: EditorSettings) -> Result<Self> {
        let mesh = source.load_mesh().map_err(EditError::Source)?;
        let errors = MeshValidator::new(&mesh).structural_errors();
        if !errors.is_empty() {
            return Err(EditError::InvalidMesh(errors.join("; ")));
        }
        tracing::info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "Loaded mesh"
        );
        Ok(Self::with_settings(mesh, settings))
    }

    /// Attach the buffer service and push the current arrays to it.
    pub fn set_buffer_sink(&mut self, sink: Box<dyn MeshBufferSink>) {
        self.sink = Some(sink);
        self.notify_buffers();
    }

    // ── Read access ──────────────────────────────────────────

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.mesh.vertices
    }

    pub fn indices(&self) -> &[VertexId] {
        &self.mesh.indices
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn gizmo_op(&self) -> GizmoOp {
        self.gizmo.op
    }

    pub fn topology_version(&self) -> u64 {
        self.topology_version
    }

    pub fn geometry_version(&self) -> u64 {
        self.geometry_version
    }

    pub fn is_extruding(&self) -> bool {
        self.extruder.is_active()
    }

    pub fn is_dragging(&self) -> bool {
        self.gizmo.is_dragging()
    }

    /// Number of times quads and quad edges were rebuilt
    pub fn topology_rebuilds(&self) -> u64 {
        self.topology.rebuild_count()
    }

    /// Logical quads of the current mesh, rebuilt if the topology changed
    pub fn quads(&mut self) -> &[Quad] {
        self.ensure_topology();
        self.topology.quads()
    }

    /// Quad perimeter edges of the current mesh, rebuilt if the topology changed
    pub fn quad_edges(&mut self) -> &QuadEdgeGraph {
        self.ensure_topology();
        self.topology.graph()
    }

    /// Position-keyed side table, rebuilt if any position moved
    pub fn position_index(&mut self) -> &PositionIndex {
        self.ensure_position_index();
        &self.position_index
    }

    /// Where the gizmo sits for the current selection
    pub fn selection_centroid(&mut self) -> Option<Vec3> {
        self.ensure_topology();
        self.selection
            .centroid(&self.mesh, self.topology.quads(), self.topology.graph())
    }

    // ── Selection ────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.selection.mode() != mode {
            tracing::debug!(?mode, "Selection mode changed");
        }
        self.selection.set_mode(mode);
    }

    /// Click on element `id` of the current mode. Unknown ids are rejected.
    pub fn toggle_selection(&mut self, id: usize, ctrl_held: bool) -> bool {
        let limit = match self.selection.mode() {
            SelectionMode::Vertex => self.mesh.vertex_count(),
            SelectionMode::Edge => self.quad_edges().len(),
            SelectionMode::Face => self.mesh.triangle_count(),
            SelectionMode::Quad => self.quads().len(),
        };
        if id >= limit {
            let err = EditError::selection(format!(
                "{:?} id {id} out of range ({limit} available)",
                self.selection.mode()
            ));
            tracing::warn!("Selection ignored: {err}");
            return false;
        }
        self.selection.toggle(id, ctrl_held);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ── Topology edits ───────────────────────────────────────

    /// Split the ring of quads crossed by the primary selected edge.
    pub fn insert_loop(&mut self) -> bool {
        match self.try_insert_loop() {
            Ok(report) => {
                tracing::debug!(?report, "Loop insertion details");
                true
            }
            Err(e) => {
                tracing::warn!("Edge loop rejected: {e}");
                false
            }
        }
    }

    fn try_insert_loop(&mut self) -> Result<ops::LoopInsertion> {
        if self.extruder.is_active() {
            return Err(EditError::ExtrusionInProgress);
        }
        let seed = self.primary_of(SelectionMode::Edge)?;
        self.ensure_topology();

        let report = ops::insert_loop(
            &mut self.mesh,
            self.topology.quads(),
            self.topology.graph(),
            seed,
            &mut self.history,
        )?;
        self.topology_changed();
        Ok(report)
    }

    /// Extrude the primary selected quad. The new cap follows later move drags.
    pub fn begin_extrude(&mut self) -> bool {
        match self.try_begin_extrude() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Extrusion rejected: {e}");
                false
            }
        }
    }

    fn try_begin_extrude(&mut self) -> Result<()> {
        if self.extruder.is_active() {
            return Err(EditError::ExtrusionInProgress);
        }
        let quad = self.primary_of(SelectionMode::Quad)?;
        self.ensure_topology();

        self.extruder
            .begin(&mut self.mesh, self.topology.quads(), quad, &mut self.history)?;
        self.topology_changed();
        Ok(())
    }

    /// Finish the current extrusion. False if none was running.
    ///
    /// The side walls only gain area during the drag, so quads are rebuilt
    /// here to pick them up.
    pub fn end_extrude(&mut self) -> bool {
        if self.gizmo.is_dragging() {
            self.gizmo.end_drag();
        }
        if self.extruder.end().is_none() {
            return false;
        }
        self.topology_changed();
        true
    }

    // ── Gizmo ────────────────────────────────────────────────

    /// Start a drag. Captures the pivot once and snapshots the mesh once; an
    /// extrusion's drag is already covered by its own snapshot.
    pub fn begin_gizmo_drag(&mut self, op: GizmoOp, axis: Option<GizmoAxis>) -> bool {
        if self.gizmo.is_dragging() {
            tracing::warn!("Drag ignored: a drag is already in progress");
            return false;
        }

        let cap_center = self.extruder.active().map(|extrusion| {
            let sum: Vec3 = extrusion
                .cap
                .iter()
                .map(|&v| position_of(&self.mesh, v))
                .sum();
            sum / 4.0
        });
        let Some(anchor) = cap_center.or_else(|| self.selection_centroid()) else {
            tracing::warn!("Drag ignored: {}", EditError::selection("nothing selected"));
            return false;
        };

        if !self.extruder.is_active() {
            self.history.push(&self.mesh);
        }
        self.gizmo.set_op(op);
        self.gizmo.begin_drag(axis, anchor);
        tracing::debug!(?op, ?axis, ?anchor, "Drag started");
        true
    }

    /// Apply one frame of drag input. Returns the number of vertex records
    /// that moved.
    pub fn apply_gizmo_delta(&mut self, delta: f32) -> usize {
        let Some(drag) = self.gizmo.record(delta) else {
            tracing::warn!("Delta ignored: no drag in progress");
            return 0;
        };

        let moved = if self.extruder.is_active() && drag.op == GizmoOp::Move {
            self.extruder.apply_delta(&mut self.mesh, drag.axis, delta)
        } else {
            self.ensure_topology();
            self.ensure_position_index();
            let targets = self.selection.corner_vertices(
                &self.mesh,
                self.topology.quads(),
                self.topology.graph(),
            );
            let d = TransformDelta {
                op: drag.op,
                axis: drag.axis,
                centroid: drag.anchor,
                delta,
            };
            ops::apply_delta(
                &mut self.mesh,
                &self.position_index,
                &targets,
                &d,
                self.settings.min_scale_factor,
            )
        };

        if moved > 0 {
            self.geometry_changed();
        }
        moved
    }

    pub fn end_gizmo_drag(&mut self) -> bool {
        match self.gizmo.end_drag() {
            Some(drag) => {
                tracing::debug!(op = ?drag.op, total = drag.accumulated, "Drag finished");
                true
            }
            None => false,
        }
    }

    // ── History ──────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let restored = self.history.undo(&self.mesh);
        self.restore(restored, "Undo")
    }

    pub fn redo(&mut self) -> bool {
        let restored = self.history.redo(&self.mesh);
        self.restore(restored, "Redo")
    }

    fn restore(&mut self, restored: Result<MeshData>, what: &str) -> bool {
        match restored {
            Ok(mesh) => {
                self.gizmo.end_drag();
                self.extruder.end();
                self.mesh = mesh;
                self.topology_changed();
                tracing::info!("{what} restored {} vertices", self.mesh.vertex_count());
                true
            }
            Err(e) => {
                tracing::warn!("{what} ignored: {e}");
                false
            }
        }
    }

    // ── Normals ──────────────────────────────────────────────

    /// Recompute normals of the selected (welded) vertices, or of the whole
    /// mesh when nothing is selected. Returns the number rewritten.
    pub fn recalculate_normals(&mut self) -> usize {
        let affected: Vec<VertexId> = if self.selection.has_selection() {
            self.ensure_topology();
            self.ensure_position_index();
            let targets = self.selection.corner_vertices(
                &self.mesh,
                self.topology.quads(),
                self.topology.graph(),
            );
            ops::welded_vertices(&self.position_index, &targets)
        } else {
            (0..self.mesh.vertex_count() as VertexId).collect()
        };
        if affected.is_empty() {
            return 0;
        }

        self.history.push(&self.mesh);
        let updated = ops::recalculate_normals(&mut self.mesh, &affected);
        tracing::info!(updated, "Recalculated normals");
        self.notify_buffers();
        updated
    }

    // ── Internals ────────────────────────────────────────────

    /// Primary id of the selection in `mode`, or the first selected one.
    fn primary_of(&self, mode: SelectionMode) -> Result<usize> {
        if self.selection.mode() != mode {
            return Err(EditError::selection(format!(
                "needs {mode:?} mode, current is {:?}",
                self.selection.mode()
            )));
        }
        let first = match self.selection.set() {
            SelectionSet::Edges(ids) | SelectionSet::Quads(ids) => ids.first().copied(),
            _ => None,
        };
        self.selection
            .primary()
            .filter(|&p| self.selection.contains(p))
            .or(first)
            .ok_or_else(|| EditError::selection(format!("no {mode:?} selected")))
    }

    fn ensure_topology(&mut self) {
        self.topology.ensure(
            &self.mesh,
            self.topology_version,
            self.settings.coplanar_threshold,
        );
    }

    fn ensure_position_index(&mut self) {
        if self.position_index_version != self.geometry_version {
            self.position_index = PositionIndex::build(&self.mesh.vertices);
            self.position_index_version = self.geometry_version;
            tracing::debug!(
                version = self.geometry_version,
                positions = self.position_index.distinct_positions(),
                "Rebuilt position index"
            );
        }
    }

    /// Index array changed: caches go stale and the selection is dropped
    fn topology_changed(&mut self) {
        self.topology_version += 1;
        self.selection.clear();
        self.geometry_changed();
    }

    fn geometry_changed(&mut self) {
        self.geometry_version += 1;
        self.notify_buffers();
    }

    fn notify_buffers(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.rebuild_buffers(&self.mesh.vertices, &self.mesh.indices);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives::grid;

    #[test]
    fn test_topology_is_cached_until_edit() {
        let mut s = MeshEditorSession::new(grid(2, 2, 1.0));
        assert_eq!(s.quads().len(), 4);
        assert_eq!(s.quad_edges().len(), 12);
        assert_eq!(s.topology_rebuilds(), 1);

        s.set_mode(SelectionMode::Quad);
        assert!(s.toggle_selection(0, false));
        assert!(s.begin_extrude());
        // walls have zero height until dragged, so only the cap pairs up
        assert_eq!(s.quads().len(), 4);
        assert_eq!(s.topology_rebuilds(), 2);

        assert!(s.begin_gizmo_drag(GizmoOp::Move, Some(GizmoAxis::Z)));
        assert_eq!(s.apply_gizmo_delta(1.0), 4);
        assert!(s.end_gizmo_drag());
        assert_eq!(s.topology_rebuilds(), 2);

        // moving vertices never rebuilds cached topology
        assert_eq!(s.quads().len(), 4);
        assert_eq!(s.topology_rebuilds(), 2);
    }

    #[test]
    fn test_walls_become_quads_after_extrusion_ends() {
        let mut s = MeshEditorSession::new(grid(2, 2, 1.0));
        s.set_mode(SelectionMode::Quad);
        assert!(s.toggle_selection(0, false));
        assert!(s.begin_extrude());
        assert_eq!(s.quads().len(), 4);

        assert!(s.begin_gizmo_drag(GizmoOp::Move, Some(GizmoAxis::Z)));
        assert_eq!(s.apply_gizmo_delta(1.0), 4);
        assert!(s.end_gizmo_drag());
        assert!(s.end_extrude());

        // three untouched cells, the cap and four walls
        assert_eq!(s.quads().len(), 8);
        assert!(!s.selection().has_selection());
        let fresh = MeshEditorSession::new(s.mesh().clone()).quads().len();
        assert_eq!(s.quads().len(), fresh);
        assert!(!s.end_extrude());
    }

    #[test]
    fn test_begin_extrude_clears_selection() {
        let mut s = MeshEditorSession::new(grid(2, 1, 1.0));
        s.set_mode(SelectionMode::Quad);
        assert!(s.toggle_selection(0, false));
        assert!(s.begin_extrude());
        assert!(!s.selection().has_selection());
        assert_eq!(s.selection().mode(), SelectionMode::Quad);
    }

    #[test]
    fn test_undo_and_redo_clear_selection() {
        let mut s = MeshEditorSession::new(grid(1, 1, 1.0));
        assert!(s.toggle_selection(0, false));
        assert!(s.begin_gizmo_drag(GizmoOp::Move, Some(GizmoAxis::Z)));
        s.apply_gizmo_delta(0.5);
        s.end_gizmo_drag();

        assert!(s.toggle_selection(1, true));
        assert!(s.undo());
        assert!(!s.selection().has_selection());

        assert!(s.toggle_selection(2, false));
        assert!(s.redo());
        assert!(!s.selection().has_selection());
    }

    #[test]
    fn test_default_capacity_keeps_twenty_drags() {
        let mut s = MeshEditorSession::new(grid(1, 1, 1.0));
        assert!(s.toggle_selection(0, false));
        for _ in 0..21 {
            assert!(s.begin_gizmo_drag(GizmoOp::Move, Some(GizmoAxis::Z)));
            s.apply_gizmo_delta(0.1);
            assert!(s.end_gizmo_drag());
        }
        assert_eq!(s.history().undo_count(), 20);
    }

    #[test]
    fn test_out_of_range_selection_rejected() {
        let mut s = MeshEditorSession::new(grid(1, 1, 1.0));
        assert!(!s.toggle_selection(4, false));
        s.set_mode(SelectionMode::Quad);
        assert!(!s.toggle_selection(1, false));
        assert!(s.toggle_selection(0, false));
    }

    #[test]
    fn test_loop_requires_edge_mode() {
        let mut s = MeshEditorSession::new(grid(1, 1, 1.0));
        assert!(s.toggle_selection(0, false));
        assert!(!s.insert_loop());
        assert!(!s.history().can_undo());
    }

    #[test]
    fn test_drag_pushes_one_snapshot() {
        let mut s = MeshEditorSession::new(grid(1, 1, 1.0));
        s.toggle_selection(0, false);
        assert!(s.begin_gizmo_drag(GizmoOp::Move, Some(GizmoAxis::Z)));
        for _ in 0..10 {
            s.apply_gizmo_delta(0.1);
        }
        assert!(s.end_gizmo_drag());
        assert_eq!(s.history().undo_count(), 1);
        assert!((s.vertices()[0].position[2] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_from_source_rejects_bad_indices() {
        let mut bad = MeshData::new(vec![Vertex::at([0.0; 3])], vec![0, 1, 2]);
        let err = MeshEditorSession::from_source(&mut bad, EditorSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, EditError::InvalidMesh(_)));
    }

    struct FailingSource;

    impl MeshSource for FailingSource {
        fn load_mesh(&mut self) -> std::result::Result<MeshData, String> {
            Err("file not found".into())
        }
    }

    #[test]
    fn test_from_source_reports_loader_error() {
        let err = MeshEditorSession::from_source(&mut FailingSource, EditorSettings::default())
            .err()
            .unwrap();
        assert_eq!(err, EditError::Source("file not found".into()));
    }
}
