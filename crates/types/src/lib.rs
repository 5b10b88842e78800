//! Core types for the maps script loader.
//!
//! Everything here is plain data: the request a caller makes, the flags the
//! coordinator exposes, and the identifiers that tie host callbacks back to
//! the script that produced them.

mod identifiers;
mod library;
mod request;
mod state;

pub use identifiers::{LoadCycle, ScriptHandle};
pub use library::{Library, LibrarySet, ParseLibraryError};
pub use request::LoadRequest;
pub use state::{LoadPhase, LoadState, ReloadVerdict};
