//! Host capabilities used by the loader.
//!
//! The loader never reaches for process-wide state directly. It is handed a
//! [`Document`] and a [`HostGlobals`] at construction and works through them:
//!
//! - [`ScriptRegistry`] - live queries over the external resource's scripts
//! - [`clear_library_handle`] - instance reset before every injection
//! - [`InMemoryDocument`] / [`InMemoryGlobals`] - in-process hosts used by the
//!   simulation runner and tests

mod document;
mod globals;
mod registry;

pub use document::{Document, InMemoryDocument, NewScript, ScriptElement};
pub use globals::{clear_library_handle, HostGlobals, InMemoryGlobals};
pub use registry::ScriptRegistry;
