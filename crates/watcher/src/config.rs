//! Watcher configuration.

use std::time::Duration;

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default retry ceiling for polling.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 7;

/// Which reload-detection strategy to run after each injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherConfig {
    /// Re-count matching scripts on a fixed interval.
    Polled {
        /// Time between polls.
        interval: Duration,
        /// Attempts after which the watcher gives up with a negative verdict.
        max_attempts: u32,
    },

    /// Re-count matching scripts whenever the head container sees insertions.
    EventDriven {
        /// How long to observe before giving up with a negative verdict.
        max_observation: Duration,
    },
}

impl WatcherConfig {
    /// Polling with the default interval and ceiling.
    pub fn polled() -> Self {
        WatcherConfig::Polled {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Mutation observation bounded by the same wall time as default polling.
    pub fn event_driven() -> Self {
        WatcherConfig::EventDriven {
            max_observation: DEFAULT_POLL_INTERVAL * DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::polled()
    }
}
