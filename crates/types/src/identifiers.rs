//! Domain-specific identifier types.

use std::fmt;

/// Handle to a script element attached to the host document.
///
/// Handles are allocated by the document and never reused, so a handle held
/// past the element's removal simply stops matching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptHandle(pub u64);

impl ScriptHandle {
    /// Get the raw handle value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScriptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.0)
    }
}

/// Sequence number of a load cycle.
///
/// Incremented every time a load is accepted. Used in logs to tie verdicts
/// and callbacks back to the cycle that armed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LoadCycle(pub u64);

impl LoadCycle {
    /// The cycle before any load has been accepted.
    pub const NONE: Self = LoadCycle(0);

    /// Get the next cycle number.
    pub fn next(self) -> Self {
        LoadCycle(self.0 + 1)
    }
}

impl fmt::Display for LoadCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cycle({})", self.0)
    }
}
