pub mod gizmo;
pub mod history;
pub mod selection;
pub mod settings;

pub use gizmo::{GizmoDrag, GizmoState};
pub use history::{MeshSnapshot, UndoStack, DEFAULT_UNDO_CAPACITY};
pub use selection::{SelectionSet, SelectionState};
pub use settings::EditorSettings;
