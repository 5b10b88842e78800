//! Head-container mutation observation.

use crate::WatchStep;
use maploader_core::{Action, TimerId};
use maploader_types::ReloadVerdict;
use std::time::Duration;
use tracing::debug;

/// Re-checks the matching-script count whenever insertions land in the head
/// container, for a bounded window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationWatcher {
    /// Batches seen so far.
    batches: u32,
    /// Verdict, once reached.
    verdict: Option<ReloadVerdict>,
}

impl MutationWatcher {
    /// Attach the observer and arm the deadline.
    pub fn start(max_observation: Duration) -> (Self, Vec<Action>) {
        let watcher = Self {
            batches: 0,
            verdict: None,
        };
        let actions = vec![
            Action::ObserveHead,
            Action::SetTimer {
                id: TimerId::ObservationDeadline,
                duration: max_observation,
            },
        ];
        (watcher, actions)
    }

    /// Mutation batches seen so far.
    pub fn batches(&self) -> u32 {
        self.batches
    }

    /// Verdict, once reached.
    pub fn verdict(&self) -> Option<ReloadVerdict> {
        self.verdict
    }

    /// Handle an insertion batch with the count observed after it landed.
    pub fn on_mutation(&mut self, observed: usize) -> WatchStep {
        if self.verdict.is_some() {
            return WatchStep::default();
        }
        self.batches += 1;

        if observed <= 1 {
            return WatchStep::default();
        }

        debug!(batches = self.batches, observed, "Observed follow-on scripts");
        self.verdict = Some(ReloadVerdict::Reloaded);
        let mut step = WatchStep::verdict(ReloadVerdict::Reloaded);
        step.actions = vec![
            Action::DisconnectObserver,
            Action::CancelTimer {
                id: TimerId::ObservationDeadline,
            },
        ];
        step
    }

    /// Handle the end of the observation window.
    pub fn on_deadline(&mut self) -> WatchStep {
        if self.verdict.is_some() {
            return WatchStep::default();
        }

        debug!(batches = self.batches, "Observation window elapsed");
        self.verdict = Some(ReloadVerdict::NotReloaded);
        let mut step = WatchStep::verdict(ReloadVerdict::NotReloaded);
        step.actions = vec![Action::DisconnectObserver];
        step
    }

    /// Detach without a verdict.
    pub fn stop(&mut self) -> Vec<Action> {
        if self.verdict.is_some() {
            return vec![];
        }
        self.verdict = Some(ReloadVerdict::NotReloaded);
        vec![
            Action::DisconnectObserver,
            Action::CancelTimer {
                id: TimerId::ObservationDeadline,
            },
        ]
    }
}
