//! Error types for mesh editing commands.
//!
//! Every variant describes a command that was rejected before it touched the
//! mesh. The session logs these and carries on; nothing here is fatal.

use thiserror::Error;

/// Result type alias using [`EditError`].
pub type Result<T> = std::result::Result<T, EditError>;

/// Reasons an edit command degrades to a no-op.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// The command needs a selection that is missing, stale, or in the wrong mode.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// `undo` was called with an empty history.
    #[error("nothing to undo")]
    EmptyUndo,

    /// `redo` was called with an empty redo stack.
    #[error("nothing to redo")]
    EmptyRedo,

    /// `begin_extrude` was called while another extrusion is being dragged.
    #[error("an extrusion is already in progress")]
    ExtrusionInProgress,

    /// The mesh handed to the session failed validation.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// The mesh source could not produce a mesh.
    #[error("mesh source failed: {0}")]
    Source(String),
}

impl EditError {
    pub(crate) fn selection(msg: impl Into<String>) -> Self {
        EditError::InvalidSelection(msg.into())
    }
}
