//! Inbound events.

use maploader_types::ScriptHandle;

/// Timers the loader can arm.
///
/// At most one timer per id is pending at a time; setting an id that is
/// already pending replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    /// Next poll of the matching-script count.
    ScriptPoll,
    /// End of the window in which head mutations are observed.
    ObservationDeadline,
    /// Release of the in-flight guard after a verdict.
    Settle,
}

/// Events delivered to the loader by its runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The injected element fired its completion callback.
    ScriptLoaded {
        /// Element whose callback fired.
        handle: ScriptHandle,
    },

    /// A globally reachable callback named in the request URL was invoked.
    GlobalCallbackInvoked {
        /// Name the callback was registered under.
        name: String,
    },

    /// A child-list mutation batch landed under the observed container.
    HeadMutated {
        /// Number of elements inserted by the batch, including subtrees.
        inserted: usize,
    },

    /// A timer fired.
    Timer(TimerId),
}

impl Event {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::ScriptLoaded { .. } => "ScriptLoaded",
            Event::GlobalCallbackInvoked { .. } => "GlobalCallbackInvoked",
            Event::HeadMutated { .. } => "HeadMutated",
            Event::Timer(TimerId::ScriptPoll) => "Timer(ScriptPoll)",
            Event::Timer(TimerId::ObservationDeadline) => "Timer(ObservationDeadline)",
            Event::Timer(TimerId::Settle) => "Timer(Settle)",
        }
    }
}
