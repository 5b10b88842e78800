//! Observable loader state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the load coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoadPhase {
    /// No load in flight; a new load will be accepted.
    #[default]
    Idle,
    /// A load is in flight; further loads are rejected.
    Loading,
}

impl LoadPhase {
    /// Whether a load is in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, LoadPhase::Loading)
    }
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadPhase::Idle => write!(f, "Idle"),
            LoadPhase::Loading => write!(f, "Loading"),
        }
    }
}

/// Terminal verdict of a completion watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReloadVerdict {
    /// More than one matching script was observed: the external resource
    /// injected follow-on scripts of its own.
    Reloaded,
    /// The watcher ran out of attempts (or time) without seeing a second script.
    NotReloaded,
}

impl ReloadVerdict {
    /// Build a verdict from an observed script count.
    pub fn from_count(count: usize) -> Self {
        if count > 1 {
            ReloadVerdict::Reloaded
        } else {
            ReloadVerdict::NotReloaded
        }
    }

    /// Whether a reload was detected.
    pub fn is_reloaded(&self) -> bool {
        matches!(self, ReloadVerdict::Reloaded)
    }
}

/// Snapshot of the flags exposed to the UI-binding layer.
///
/// `is_ready` and `reload_detected` are set by independent events and carry
/// no ordering relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadState {
    /// A load is in flight.
    pub in_flight: bool,
    /// The injected script reported completion.
    pub is_ready: bool,
    /// The watcher observed follow-on scripts.
    pub reload_detected: bool,
}

impl LoadState {
    /// Phase implied by the in-flight flag.
    pub fn phase(&self) -> LoadPhase {
        if self.in_flight {
            LoadPhase::Loading
        } else {
            LoadPhase::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_threshold() {
        assert_eq!(ReloadVerdict::from_count(0), ReloadVerdict::NotReloaded);
        assert_eq!(ReloadVerdict::from_count(1), ReloadVerdict::NotReloaded);
        assert_eq!(ReloadVerdict::from_count(2), ReloadVerdict::Reloaded);
        assert!(ReloadVerdict::from_count(4).is_reloaded());
    }

    #[test]
    fn test_state_json_snapshot() {
        let state = LoadState {
            in_flight: true,
            is_ready: false,
            reload_detected: false,
        };
        assert_eq!(state.phase(), LoadPhase::Loading);
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#"{"inFlight":true,"isReady":false,"reloadDetected":false}"#
        );
    }
}
