//! The state machine contract between the loader and its runner.

use crate::{Action, Event};
use std::time::Duration;

/// Loader logic driven one event at a time.
///
/// Host callbacks, timer expiries and observer batches arrive as [`Event`]s.
/// Each call to [`handle`](Self::handle) runs to completion before the next
/// event is delivered, and the same state fed the same event yields the same
/// actions. Host capabilities owned by the implementor may be mutated inside
/// `handle`; everything that has to happen later is returned as an
/// [`Action`].
///
/// ```ignore
/// let mut actions = coordinator.load_script("id", "ID")?;
/// while let Some(event) = next_event(&mut actions) {
///     coordinator.set_time(clock.now());
///     actions = coordinator.handle(event);
/// }
/// ```
pub trait StateMachine {
    /// Apply one event.
    ///
    /// Returned actions are executed by the runner in order: timers to arm or
    /// cancel, the head observer to attach or detach, and load states to
    /// publish to the UI binding.
    fn handle(&mut self, event: Event) -> Vec<Action>;

    /// Update the clock before the next `handle()`.
    fn set_time(&mut self, now: Duration);

    /// The time last passed to `set_time()`.
    fn now(&self) -> Duration;
}
