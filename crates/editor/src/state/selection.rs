use glam::Vec3;
use shared::SelectionMode;

use crate::mesh::{position_of, MeshData, VertexId};
use crate::topology::{Quad, QuadEdgeGraph};

/// Selection payload for the active mode. Exactly one kind is live at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionSet {
    /// Vertex indices (in order of selection)
    Vertices(Vec<VertexId>),
    /// Quad-edge ids (in order of selection)
    Edges(Vec<usize>),
    /// Single triangle index
    Face(Option<usize>),
    /// Quad ids (in order of selection)
    Quads(Vec<usize>),
}

impl SelectionSet {
    /// Empty set owned by `mode`
    pub fn empty(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Vertex => SelectionSet::Vertices(Vec::new()),
            SelectionMode::Edge => SelectionSet::Edges(Vec::new()),
            SelectionMode::Face => SelectionSet::Face(None),
            SelectionMode::Quad => SelectionSet::Quads(Vec::new()),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            SelectionSet::Vertices(_) => SelectionMode::Vertex,
            SelectionSet::Edges(_) => SelectionMode::Edge,
            SelectionSet::Face(_) => SelectionMode::Face,
            SelectionSet::Quads(_) => SelectionMode::Quad,
        }
    }

    /// Selected ids as `usize`, in selection order
    pub fn ids(&self) -> Vec<usize> {
        match self {
            SelectionSet::Vertices(v) => v.iter().map(|&i| i as usize).collect(),
            SelectionSet::Edges(ids) | SelectionSet::Quads(ids) => ids.clone(),
            SelectionSet::Face(face) => face.iter().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SelectionSet::Vertices(v) => v.len(),
            SelectionSet::Edges(ids) | SelectionSet::Quads(ids) => ids.len(),
            SelectionSet::Face(face) => usize::from(face.is_some()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Toggle `id` in an ordered id list. Returns true if it was inserted.
fn xor_id<T: PartialEq>(ids: &mut Vec<T>, id: T) -> bool {
    if let Some(pos) = ids.iter().position(|s| *s == id) {
        ids.remove(pos);
        false
    } else {
        ids.push(id);
        true
    }
}

/// Mesh element selection (single active mode, multi-select within it)
#[derive(Debug, Clone)]
pub struct SelectionState {
    set: SelectionSet,
    /// Most recently Ctrl-added id; anchors the gizmo info display
    primary: Option<usize>,
    /// Version counter for selection changes (for overlay cache invalidation)
    version: u64,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            set: SelectionSet::empty(SelectionMode::default()),
            primary: None,
            version: 0,
        }
    }
}

impl SelectionState {
    pub fn mode(&self) -> SelectionMode {
        self.set.mode()
    }

    pub fn set(&self) -> &SelectionSet {
        &self.set
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Primary id: the last Ctrl-added element, or the single selected one
    pub fn primary(&self) -> Option<usize> {
        self.primary
    }

    /// Switch mode. Clears the selection if the mode changes.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.mode() != mode {
            self.set = SelectionSet::empty(mode);
            self.primary = None;
            self.version += 1;
        }
    }

    /// Click behavior: Ctrl held XORs `id` into the set and marks it primary,
    /// otherwise the set is replaced with `{id}`.
    pub fn toggle(&mut self, id: usize, ctrl_held: bool) {
        if !ctrl_held {
            self.set = match self.mode() {
                SelectionMode::Vertex => SelectionSet::Vertices(vec![id as VertexId]),
                SelectionMode::Edge => SelectionSet::Edges(vec![id]),
                SelectionMode::Face => SelectionSet::Face(Some(id)),
                SelectionMode::Quad => SelectionSet::Quads(vec![id]),
            };
            self.primary = Some(id);
            self.version += 1;
            return;
        }

        let inserted = match &mut self.set {
            SelectionSet::Vertices(v) => xor_id(v, id as VertexId),
            SelectionSet::Edges(ids) | SelectionSet::Quads(ids) => xor_id(ids, id),
            SelectionSet::Face(face) => {
                if *face == Some(id) {
                    *face = None;
                    false
                } else {
                    *face = Some(id);
                    true
                }
            }
        };

        if inserted {
            self.primary = Some(id);
        } else if self.primary == Some(id) {
            self.primary = self.set.ids().last().copied();
        }
        self.version += 1;
    }

    /// Clear all selection (mode is kept)
    pub fn clear(&mut self) {
        if !self.set.is_empty() || self.primary.is_some() {
            self.set = SelectionSet::empty(self.mode());
            self.primary = None;
            self.version += 1;
        }
    }

    pub fn has_selection(&self) -> bool {
        !self.set.is_empty()
    }

    pub fn count(&self) -> usize {
        self.set.len()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.set.ids().contains(&id)
    }

    /// Vertex indices named by the selection (edge endpoints, face or quad
    /// corners). Ids that no longer exist are skipped. May contain repeats.
    pub fn corner_vertices(
        &self,
        mesh: &MeshData,
        quads: &[Quad],
        graph: &QuadEdgeGraph,
    ) -> Vec<VertexId> {
        let vertex_count = mesh.vertex_count();
        let corners: Vec<VertexId> = match &self.set {
            SelectionSet::Vertices(v) => v.clone(),
            SelectionSet::Edges(ids) => ids
                .iter()
                .filter_map(|&e| graph.get(e))
                .flat_map(|e| [e.v0, e.v1])
                .collect(),
            SelectionSet::Face(face) => face
                .and_then(|f| mesh.triangle(f))
                .map(|t| t.to_vec())
                .unwrap_or_default(),
            SelectionSet::Quads(ids) => ids
                .iter()
                .filter_map(|&q| quads.get(q))
                .flat_map(|q| q.iter().copied())
                .collect(),
        };
        corners
            .into_iter()
            .filter(|&v| (v as usize) < vertex_count)
            .collect()
    }

    /// Average world position of the selection, used to anchor the gizmo.
    /// Edges contribute their midpoints, quads their corner averages.
    pub fn centroid(
        &self,
        mesh: &MeshData,
        quads: &[Quad],
        graph: &QuadEdgeGraph,
    ) -> Option<Vec3> {
        let vertex_count = mesh.vertex_count() as u32;
        let in_range = |v: &VertexId| *v < vertex_count;

        let points: Vec<Vec3> = match &self.set {
            SelectionSet::Vertices(v) => v
                .iter()
                .filter(|&&v| v < vertex_count)
                .map(|&v| position_of(mesh, v))
                .collect(),
            SelectionSet::Edges(ids) => ids
                .iter()
                .filter_map(|&e| graph.get(e))
                .filter(|e| in_range(&e.v0) && in_range(&e.v1))
                .map(|e| (position_of(mesh, e.v0) + position_of(mesh, e.v1)) * 0.5)
                .collect(),
            SelectionSet::Face(face) => face
                .and_then(|f| mesh.triangle(f))
                .filter(|t| t.iter().all(in_range))
                .map(|t| {
                    (position_of(mesh, t[0]) + position_of(mesh, t[1]) + position_of(mesh, t[2]))
                        / 3.0
                })
                .into_iter()
                .collect(),
            SelectionSet::Quads(ids) => ids
                .iter()
                .filter_map(|&q| quads.get(q))
                .filter(|q| q.iter().all(in_range))
                .map(|q| q.iter().map(|&v| position_of(mesh, v)).sum::<Vec3>() * 0.25)
                .collect(),
        };

        if points.is_empty() {
            return None;
        }
        Some(points.iter().copied().sum::<Vec3>() / points.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives::grid;
    use crate::topology::{reconstruct_quads, DEFAULT_COPLANAR_THRESHOLD};

    #[test]
    fn test_initial_empty() {
        let s = SelectionState::default();
        assert_eq!(s.mode(), SelectionMode::Vertex);
        assert!(!s.has_selection());
        assert!(s.primary().is_none());
        assert_eq!(s.count(), 0);
    }

    #[test]
    fn test_toggle_without_ctrl_replaces() {
        let mut s = SelectionState::default();
        s.toggle(3, false);
        s.toggle(5, false);
        assert_eq!(s.count(), 1);
        assert!(s.contains(5));
        assert!(!s.contains(3));
        assert_eq!(s.primary(), Some(5));
    }

    #[test]
    fn test_ctrl_toggle_adds_and_removes() {
        let mut s = SelectionState::default();
        s.toggle(1, false);
        s.toggle(2, true);
        s.toggle(4, true);
        assert_eq!(s.set().ids(), vec![1, 2, 4]);
        assert_eq!(s.primary(), Some(4));

        s.toggle(2, true);
        assert_eq!(s.set().ids(), vec![1, 4]);
        assert_eq!(s.primary(), Some(4));

        s.toggle(4, true);
        assert_eq!(s.primary(), Some(1));
    }

    #[test]
    fn test_set_mode_clears_other_sets() {
        let mut s = SelectionState::default();
        s.toggle(1, false);
        s.set_mode(SelectionMode::Quad);
        assert_eq!(s.mode(), SelectionMode::Quad);
        assert!(!s.has_selection());
        assert!(matches!(s.set(), SelectionSet::Quads(q) if q.is_empty()));
    }

    #[test]
    fn test_set_same_mode_keeps_selection() {
        let mut s = SelectionState::default();
        s.set_mode(SelectionMode::Edge);
        s.toggle(7, false);
        s.set_mode(SelectionMode::Edge);
        assert!(s.contains(7));
    }

    #[test]
    fn test_face_mode_is_single() {
        let mut s = SelectionState::default();
        s.set_mode(SelectionMode::Face);
        s.toggle(2, true);
        s.toggle(3, true);
        assert_eq!(s.count(), 1);
        assert!(s.contains(3));
        s.toggle(3, true);
        assert!(!s.has_selection());
    }

    #[test]
    fn test_clear_bumps_version() {
        let mut s = SelectionState::default();
        s.toggle(0, false);
        let v = s.version();
        s.clear();
        assert!(s.version() > v);
        assert!(s.primary().is_none());
        let v = s.version();
        s.clear();
        assert_eq!(s.version(), v);
    }

    #[test]
    fn test_centroid_per_mode() {
        let mesh = grid(2, 1, 1.0);
        let quads = reconstruct_quads(&mesh, DEFAULT_COPLANAR_THRESHOLD);
        let graph = QuadEdgeGraph::build(&quads);

        let mut s = SelectionState::default();
        s.toggle(0, false);
        s.toggle(2, true);
        let c = s.centroid(&mesh, &quads, &graph).unwrap();
        assert!((c - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);

        s.set_mode(SelectionMode::Quad);
        s.toggle(0, false);
        s.toggle(1, true);
        let c = s.centroid(&mesh, &quads, &graph).unwrap();
        assert!((c - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-6);

        s.set_mode(SelectionMode::Edge);
        let shared = graph.find(1, 4).unwrap();
        s.toggle(shared, false);
        let c = s.centroid(&mesh, &quads, &graph).unwrap();
        assert!((c - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_centroid_skips_stale_ids() {
        let mesh = grid(1, 1, 1.0);
        let quads = reconstruct_quads(&mesh, DEFAULT_COPLANAR_THRESHOLD);
        let graph = QuadEdgeGraph::build(&quads);

        let mut s = SelectionState::default();
        s.set_mode(SelectionMode::Quad);
        s.toggle(42, false);
        assert!(s.centroid(&mesh, &quads, &graph).is_none());
        assert!(s.corner_vertices(&mesh, &quads, &graph).is_empty());
    }
}
