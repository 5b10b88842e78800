//! Bounded polling of the matching-script count.

use crate::WatchStep;
use maploader_core::{Action, TimerId};
use maploader_types::ReloadVerdict;
use std::time::Duration;
use tracing::{debug, trace};

/// Re-checks the matching-script count on a fixed interval.
///
/// Each poll timer is one attempt. The watcher reports `Reloaded` on the
/// first attempt that observes more than one matching script, or
/// `NotReloaded` once the attempt count reaches the ceiling. Either way it
/// stops rescheduling itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingWatcher {
    /// Time between polls.
    interval: Duration,
    /// Attempt count at which the watcher gives up.
    max_attempts: u32,
    /// Attempts made so far (may start above zero for manual runs).
    attempts: u32,
    /// Count observed before the first poll, folded into the first attempt.
    seed_count: Option<usize>,
    /// Verdict, once reached.
    verdict: Option<ReloadVerdict>,
}

impl PollingWatcher {
    /// Start polling from attempt zero.
    pub fn start(interval: Duration, max_attempts: u32) -> (Self, Vec<Action>) {
        Self::start_at(interval, max_attempts, 0, 0)
    }

    /// Start polling from an arbitrary attempt, with a count already observed.
    ///
    /// # Arguments
    ///
    /// * `interval` - Time between polls
    /// * `max_attempts` - Attempt count at which the watcher gives up
    /// * `retry` - Attempts to consider already spent
    /// * `initial_count` - Matching-script count to treat as already observed
    pub fn start_at(
        interval: Duration,
        max_attempts: u32,
        retry: u32,
        initial_count: usize,
    ) -> (Self, Vec<Action>) {
        let watcher = Self {
            interval,
            max_attempts,
            attempts: retry,
            seed_count: Some(initial_count),
            verdict: None,
        };
        let actions = vec![watcher.next_poll()];
        (watcher, actions)
    }

    fn next_poll(&self) -> Action {
        Action::SetTimer {
            id: TimerId::ScriptPoll,
            duration: self.interval,
        }
    }

    /// Attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Verdict, once reached.
    pub fn verdict(&self) -> Option<ReloadVerdict> {
        self.verdict
    }

    /// Handle a poll timer with the count observed at that moment.
    pub fn on_poll(&mut self, observed: usize) -> WatchStep {
        if self.verdict.is_some() {
            return WatchStep::default();
        }

        let observed = observed.max(self.seed_count.take().unwrap_or(0));
        self.attempts = self.attempts.saturating_add(1);

        trace!(attempt = self.attempts, observed, "Polled matching scripts");

        if observed > 1 || self.attempts >= self.max_attempts {
            let verdict = ReloadVerdict::from_count(observed);
            debug!(
                attempts = self.attempts,
                observed,
                ?verdict,
                "Polling watcher reached verdict"
            );
            self.verdict = Some(verdict);
            return WatchStep::verdict(verdict);
        }

        WatchStep::pending(vec![self.next_poll()])
    }

    /// Stop polling without a verdict.
    pub fn stop(&mut self) -> Vec<Action> {
        if self.verdict.is_some() {
            return vec![];
        }
        self.verdict = Some(ReloadVerdict::NotReloaded);
        vec![Action::CancelTimer {
            id: TimerId::ScriptPoll,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const INTERVAL: Duration = Duration::from_millis(1);

    #[test]
    fn test_start_schedules_first_poll() {
        let (_, actions) = PollingWatcher::start(INTERVAL, 7);
        assert_eq!(
            actions,
            vec![Action::SetTimer {
                id: TimerId::ScriptPoll,
                duration: INTERVAL
            }]
        );
    }

    #[test]
    fn test_reload_detected_at_attempt_k() {
        for k in 1..7u32 {
            let (mut watcher, _) = PollingWatcher::start(INTERVAL, 7);
            for attempt in 1..k {
                let step = watcher.on_poll(1);
                assert_eq!(step.verdict, None, "attempt {attempt} of k={k}");
            }
            let step = watcher.on_poll(3);
            assert_eq!(step.verdict, Some(ReloadVerdict::Reloaded));
            assert!(step.actions.is_empty());
            assert_eq!(watcher.attempts(), k);
        }
    }

    #[traced_test]
    #[test]
    fn test_ceiling_gives_negative_verdict() {
        let (mut watcher, _) = PollingWatcher::start(INTERVAL, 7);
        for _ in 0..6 {
            let step = watcher.on_poll(1);
            assert_eq!(step.verdict, None);
            assert_eq!(step.actions.len(), 1);
        }
        let step = watcher.on_poll(1);
        assert_eq!(step.verdict, Some(ReloadVerdict::NotReloaded));
        assert!(step.actions.is_empty());
        assert!(logs_contain("Polling watcher reached verdict"));
    }

    #[test]
    fn test_retry_at_ceiling_settles_on_first_poll() {
        let (mut watcher, _) = PollingWatcher::start_at(INTERVAL, 7, 7, 0);
        let step = watcher.on_poll(1);
        assert_eq!(step.verdict, Some(ReloadVerdict::NotReloaded));
    }

    #[test]
    fn test_initial_count_counts_as_observed() {
        let (mut watcher, _) = PollingWatcher::start_at(INTERVAL, 7, 0, 2);
        let step = watcher.on_poll(0);
        assert_eq!(step.verdict, Some(ReloadVerdict::Reloaded));
    }

    #[test]
    fn test_initial_count_only_seeds_first_poll() {
        let (mut watcher, _) = PollingWatcher::start_at(INTERVAL, 7, 0, 1);
        assert_eq!(watcher.on_poll(0).verdict, None);
        assert_eq!(watcher.on_poll(1).verdict, None);
    }

    #[test]
    fn test_single_shot() {
        let (mut watcher, _) = PollingWatcher::start(INTERVAL, 7);
        assert!(watcher.on_poll(2).verdict.is_some());
        let step = watcher.on_poll(5);
        assert_eq!(step, WatchStep::default());
        assert!(watcher.stop().is_empty());
    }

    #[test]
    fn test_stop_cancels_pending_poll() {
        let (mut watcher, _) = PollingWatcher::start(INTERVAL, 7);
        assert_eq!(
            watcher.stop(),
            vec![Action::CancelTimer {
                id: TimerId::ScriptPoll
            }]
        );
        assert_eq!(watcher.on_poll(3).verdict, None);
    }
}
