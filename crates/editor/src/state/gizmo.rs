use glam::Vec3;
use shared::{GizmoAxis, GizmoOp};

/// Per-drag scratch values, captured when the drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoDrag {
    pub op: GizmoOp,
    /// Constrained axis (None = uniform, scale only)
    pub axis: Option<GizmoAxis>,
    /// Selection centroid at drag start; scale and rotate pivot around it
    pub anchor: Vec3,
    /// Sum of deltas applied so far
    pub accumulated: f32,
}

/// State of the transform gizmo
#[derive(Debug, Default)]
pub struct GizmoState {
    /// Operation used by the next drag
    pub op: GizmoOp,
    drag: Option<GizmoDrag>,
}

impl GizmoState {
    pub fn set_op(&mut self, op: GizmoOp) {
        self.op = op;
    }

    pub fn begin_drag(&mut self, axis: Option<GizmoAxis>, anchor: Vec3) {
        self.drag = Some(GizmoDrag {
            op: self.op,
            axis,
            anchor,
            accumulated: 0.0,
        });
    }

    pub fn drag(&self) -> Option<&GizmoDrag> {
        self.drag.as_ref()
    }

    /// Record a per-frame delta and return the drag it belongs to
    pub fn record(&mut self, delta: f32) -> Option<GizmoDrag> {
        let drag = self.drag.as_mut()?;
        drag.accumulated += delta;
        Some(*drag)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn end_drag(&mut self) -> Option<GizmoDrag> {
        self.drag.take()
    }
}
