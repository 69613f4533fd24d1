// Library crate: the editing kernel plus the headless harness and JSON
// command protocol used by the binary and integration tests.

pub mod command;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod mesh;
pub mod ops;
pub mod session;
pub mod state;
pub mod topology;
pub mod validation;

pub use error::{EditError, Result};
pub use session::{MeshBufferSink, MeshEditorSession, MeshSource};
