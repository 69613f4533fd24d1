//! JSON command protocol for scripted editing sessions.
//!
//! Each command maps onto one session entry point. Rejected commands still
//! produce a response (`success: false` with an error message) so a batch
//! keeps running.

use serde::{Deserialize, Serialize};
use shared::{GizmoAxis, GizmoOp, SelectionMode};

use crate::harness::TestHarness;
use crate::state::SelectionSet;

/// A command the session can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    /// Switch the selection mode (clears the selection on change)
    SetMode { mode: SelectionMode },
    /// Click an element of the current mode
    Select {
        id: usize,
        #[serde(default)]
        ctrl: bool,
    },
    /// Clear selection.
    ClearSelection,
    /// Insert an edge loop at the selected edge
    InsertLoop,
    /// Extrude the selected quad
    BeginExtrude,
    EndExtrude,
    /// Start a gizmo drag
    BeginDrag {
        #[serde(default)]
        op: GizmoOp,
        #[serde(default)]
        axis: Option<GizmoAxis>,
    },
    /// One frame of drag input
    Drag { delta: f32 },
    EndDrag,
    /// Undo the last operation.
    Undo,
    /// Redo the last undone operation.
    Redo,
    /// Recompute normals of the selection (or the whole mesh)
    RecalculateNormals,
    /// Report mesh, topology and selection counts
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }

    fn from_flag(ok: bool, msg: &str) -> Self {
        if ok {
            Self::ok()
        } else {
            Self::err(msg)
        }
    }
}

fn selection_json(set: &SelectionSet) -> serde_json::Value {
    serde_json::json!({
        "mode": set.mode(),
        "ids": set.ids(),
    })
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: EditCommand) -> CommandResponse {
    let session = &mut harness.session;
    match cmd {
        EditCommand::SetMode { mode } => {
            session.set_mode(mode);
            CommandResponse::ok()
        }

        EditCommand::Select { id, ctrl } => {
            if session.toggle_selection(id, ctrl) {
                CommandResponse::ok_with_data(selection_json(session.selection().set()))
            } else {
                CommandResponse::err(format!("id {id} is not selectable"))
            }
        }

        EditCommand::ClearSelection => {
            session.clear_selection();
            CommandResponse::ok()
        }

        EditCommand::InsertLoop => {
            let before = session.vertices().len();
            if session.insert_loop() {
                CommandResponse::ok_with_data(serde_json::json!({
                    "new_vertices": session.vertices().len() - before,
                    "triangles": session.indices().len() / 3,
                }))
            } else {
                CommandResponse::err("edge loop needs one selected quad edge in edge mode")
            }
        }

        EditCommand::BeginExtrude => CommandResponse::from_flag(
            session.begin_extrude(),
            "extrusion needs one selected quad in quad mode and no extrusion in progress",
        ),

        EditCommand::EndExtrude => {
            CommandResponse::from_flag(session.end_extrude(), "no extrusion in progress")
        }

        EditCommand::BeginDrag { op, axis } => CommandResponse::from_flag(
            session.begin_gizmo_drag(op, axis),
            "drag needs a selection (or an extrusion) and no drag in progress",
        ),

        EditCommand::Drag { delta } => {
            if !session.is_dragging() {
                return CommandResponse::err("no drag in progress");
            }
            let moved = session.apply_gizmo_delta(delta);
            CommandResponse::ok_with_data(serde_json::json!({ "moved": moved }))
        }

        EditCommand::EndDrag => {
            CommandResponse::from_flag(session.end_gizmo_drag(), "no drag in progress")
        }

        EditCommand::Undo => {
            let success = session.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        EditCommand::Redo => {
            let success = session.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        EditCommand::RecalculateNormals => {
            let updated = session.recalculate_normals();
            CommandResponse::ok_with_data(serde_json::json!({ "updated": updated }))
        }

        EditCommand::Inspect => {
            let quads = session.quads().len();
            let graph = session.quad_edges();
            let edges = graph.len();
            let boundary = graph.boundary_edges().count();
            let centroid = session.selection_centroid().map(|c| c.to_array());
            CommandResponse::ok_with_data(serde_json::json!({
                "vertex_count": session.vertices().len(),
                "triangle_count": session.indices().len() / 3,
                "quad_count": quads,
                "edge_count": edges,
                "boundary_edge_count": boundary,
                "selection": selection_json(session.selection().set()),
                "centroid": centroid,
                "undo_count": session.history().undo_count(),
                "redo_count": session.history().redo_count(),
                "extruding": session.is_extruding(),
            }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: EditCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<EditCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
