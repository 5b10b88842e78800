//! Completion watchers for reload detection.
//!
//! After each injection the loader arms one [`CompletionWatcher`]. The
//! watcher turns observations of the matching-script count into exactly one
//! [`ReloadVerdict`]:
//!
//! - [`PollingWatcher`] re-counts on a timer, up to an attempt ceiling
//! - [`MutationWatcher`] re-counts whenever the head container sees
//!   insertions, up to an observation deadline
//!
//! Watchers only report facts. Interpreting a verdict (setting flags,
//! releasing the in-flight guard) is the coordinator's job.

mod config;
mod mutation;
mod polling;

pub use config::{WatcherConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
pub use mutation::MutationWatcher;
pub use polling::PollingWatcher;

use maploader_core::Action;
use maploader_types::ReloadVerdict;
use std::time::Duration;

/// Result of feeding one observation to a watcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchStep {
    /// Actions for the runner (reschedule, detach, ...).
    pub actions: Vec<Action>,
    /// Set on the one step that reaches a verdict.
    pub verdict: Option<ReloadVerdict>,
}

impl WatchStep {
    fn pending(actions: Vec<Action>) -> Self {
        Self {
            actions,
            verdict: None,
        }
    }

    fn verdict(verdict: ReloadVerdict) -> Self {
        Self {
            actions: vec![],
            verdict: Some(verdict),
        }
    }
}

/// A single-shot reload detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionWatcher {
    EventDriven(MutationWatcher),
    Polled(PollingWatcher),
}

impl CompletionWatcher {
    /// Arm a watcher for the given strategy.
    pub fn start(config: WatcherConfig) -> (Self, Vec<Action>) {
        match config {
            WatcherConfig::Polled {
                interval,
                max_attempts,
            } => {
                let (watcher, actions) = PollingWatcher::start(interval, max_attempts);
                (CompletionWatcher::Polled(watcher), actions)
            }
            WatcherConfig::EventDriven { max_observation } => {
                let (watcher, actions) = MutationWatcher::start(max_observation);
                (CompletionWatcher::EventDriven(watcher), actions)
            }
        }
    }

    /// Arm a polling watcher with explicit starting conditions.
    pub fn start_polling_at(
        interval: Duration,
        max_attempts: u32,
        retry: u32,
        initial_count: usize,
    ) -> (Self, Vec<Action>) {
        let (watcher, actions) =
            PollingWatcher::start_at(interval, max_attempts, retry, initial_count);
        (CompletionWatcher::Polled(watcher), actions)
    }

    /// Feed a poll timer. Ignored by event-driven watchers.
    pub fn on_poll(&mut self, observed: usize) -> WatchStep {
        match self {
            CompletionWatcher::Polled(w) => w.on_poll(observed),
            CompletionWatcher::EventDriven(_) => WatchStep::default(),
        }
    }

    /// Feed a head mutation batch. Ignored by polling watchers.
    pub fn on_mutation(&mut self, observed: usize) -> WatchStep {
        match self {
            CompletionWatcher::EventDriven(w) => w.on_mutation(observed),
            CompletionWatcher::Polled(_) => WatchStep::default(),
        }
    }

    /// Feed the observation deadline. Ignored by polling watchers.
    pub fn on_deadline(&mut self) -> WatchStep {
        match self {
            CompletionWatcher::EventDriven(w) => w.on_deadline(),
            CompletionWatcher::Polled(_) => WatchStep::default(),
        }
    }

    /// Tear down without reporting a verdict.
    pub fn stop(&mut self) -> Vec<Action> {
        match self {
            CompletionWatcher::EventDriven(w) => w.stop(),
            CompletionWatcher::Polled(w) => w.stop(),
        }
    }

    /// Whether the watcher has finished.
    pub fn is_finished(&self) -> bool {
        match self {
            CompletionWatcher::EventDriven(w) => w.verdict().is_some(),
            CompletionWatcher::Polled(w) => w.verdict().is_some(),
        }
    }
}
