//! Outbound actions.

use crate::TimerId;
use maploader_types::{LoadState, ScriptHandle};
use std::time::Duration;

/// Actions the runner performs on behalf of the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ═══════════════════════════════════════════════════════════════════════
    // Timers
    // ═══════════════════════════════════════════════════════════════════════
    /// Fire `Event::Timer(id)` after `duration`, replacing any pending timer
    /// with the same id.
    SetTimer { id: TimerId, duration: Duration },

    /// Drop the pending timer with this id, if any.
    CancelTimer { id: TimerId },

    // ═══════════════════════════════════════════════════════════════════════
    // Observation
    // ═══════════════════════════════════════════════════════════════════════
    /// Start delivering `Event::HeadMutated` for insertions under the head
    /// container and its subtree.
    ObserveHead,

    /// Stop delivering head mutations.
    DisconnectObserver,

    // ═══════════════════════════════════════════════════════════════════════
    // Notifications
    // ═══════════════════════════════════════════════════════════════════════
    /// A new load target was attached to the document.
    ScriptInjected { handle: ScriptHandle, src: String },

    /// The externally visible flags changed.
    EmitLoadState(LoadState),
}

impl Action {
    /// Get a human-readable name for this action type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::SetTimer { .. } => "SetTimer",
            Action::CancelTimer { .. } => "CancelTimer",
            Action::ObserveHead => "ObserveHead",
            Action::DisconnectObserver => "DisconnectObserver",
            Action::ScriptInjected { .. } => "ScriptInjected",
            Action::EmitLoadState(_) => "EmitLoadState",
        }
    }

    /// Check if this action schedules or cancels a timer.
    pub fn is_timer(&self) -> bool {
        matches!(self, Action::SetTimer { .. } | Action::CancelTimer { .. })
    }
}
