//! Deterministic simulation runner.

use crate::event_queue::{EventKey, EventQueue, Scheduled};
use crate::ExternalResource;
use maploader_core::{Action, Event, StateMachine, TimerId};
use maploader_host::NewScript;
use maploader_loader::{CallbackMode, LoadCoordinator};
use maploader_types::{LoadState, ScriptHandle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Upper bound on events processed by [`SimulationRunner::run_until_idle`].
const MAX_IDLE_STEPS: u64 = 100_000;

/// Counters collected over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Events delivered to the coordinator.
    pub events_processed: u64,
    /// Timer events among them.
    pub timers_fired: u64,
    /// Head mutation batches delivered to the coordinator.
    pub mutations_delivered: u64,
    /// Load calls accepted.
    pub loads_accepted: u64,
    /// Load calls refused by the in-flight guard.
    pub loads_rejected: u64,
    /// Times the external script executed its bootstrap.
    pub bootstraps_run: u64,
}

/// Drives a [`LoadCoordinator`] against simulated time.
///
/// Plays the role of the browser event loop: fires timers, delivers
/// mutation-observer batches while an observer is attached, runs the
/// external resource's bootstrap after it is injected, and records every
/// state notification for the UI binding. Given the same seed, a run is
/// fully reproducible.
pub struct SimulationRunner {
    coordinator: LoadCoordinator,
    resource: ExternalResource,
    queue: EventQueue,
    timers: HashMap<TimerId, EventKey>,
    observing: bool,
    now: Duration,
    rng: ChaCha8Rng,
    notifications: Vec<LoadState>,
    injected: Vec<(ScriptHandle, String)>,
    stats: SimulationStats,
}

impl SimulationRunner {
    /// Create a runner.
    pub fn new(coordinator: LoadCoordinator, resource: ExternalResource, seed: u64) -> Self {
        Self {
            coordinator,
            resource,
            queue: EventQueue::default(),
            timers: HashMap::new(),
            observing: false,
            now: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed),
            notifications: Vec::new(),
            injected: Vec::new(),
            stats: SimulationStats::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════════

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn coordinator(&self) -> &LoadCoordinator {
        &self.coordinator
    }

    /// Every state the coordinator announced, oldest first.
    pub fn notifications(&self) -> &[LoadState] {
        &self.notifications
    }

    /// Every script the coordinator injected, oldest first.
    pub fn injected(&self) -> &[(ScriptHandle, String)] {
        &self.injected
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// Whether a head observer is attached.
    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Whether a timer with this id is pending.
    pub fn has_timer(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Number of scheduled items.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Replace the external resource model for subsequent injections.
    pub fn set_resource(&mut self, resource: ExternalResource) {
        self.resource = resource;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Caller-facing operations
    // ═══════════════════════════════════════════════════════════════════════════

    /// Ask the coordinator to load. Returns false if the call was refused.
    pub fn load_script(&mut self, locale: &str, region: &str) -> bool {
        self.coordinator.set_time(self.now);
        match self.coordinator.load_script(locale, region) {
            Ok(actions) => {
                self.stats.loads_accepted += 1;
                self.process_actions(actions);
                true
            }
            Err(e) => {
                self.stats.loads_rejected += 1;
                debug!(error = %e, "Load refused");
                false
            }
        }
    }

    /// Run the coordinator's polling watcher with explicit starting conditions.
    pub fn check_all_scripts(&mut self, retry: u32, interval: Duration, initial_count: usize) {
        self.coordinator.set_time(self.now);
        let actions = self
            .coordinator
            .check_all_scripts(retry, interval, initial_count);
        self.process_actions(actions);
    }

    /// Append scripts to the head as one insertion batch, as a third party would.
    pub fn inject_scripts<I, S>(&mut self, srcs: I) -> Vec<ScriptHandle>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let handles: Vec<ScriptHandle> = srcs
            .into_iter()
            .map(|src| {
                self.coordinator
                    .document_mut()
                    .append_script(NewScript::with_src(src))
            })
            .collect();
        self.flush_mutations();
        handles
    }

    /// Emit a warning through the host's warning channel.
    pub fn emit_warning(&mut self, message: &str) {
        self.coordinator.warnings_mut().warn(message);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Running
    // ═══════════════════════════════════════════════════════════════════════════

    /// Process the next scheduled item. Returns false if nothing is scheduled.
    pub fn step(&mut self) -> bool {
        let Some((key, item)) = self.queue.pop_first() else {
            return false;
        };
        self.now = self.now.max(key.time);

        match item {
            Scheduled::Deliver(event) => {
                if let Event::Timer(id) = &event {
                    // A replaced or cancelled timer is removed from the queue,
                    // so anything popped here is the live one.
                    self.timers.remove(id);
                    self.stats.timers_fired += 1;
                }
                self.deliver(event);
            }
            Scheduled::Bootstrap { handle } => self.run_bootstrap(handle),
        }
        true
    }

    /// Process everything scheduled up to and including `time`, then advance
    /// the clock to `time`.
    pub fn run_until(&mut self, time: Duration) {
        while self.queue.peek_time().is_some_and(|t| t <= time) {
            self.step();
        }
        self.now = self.now.max(time);
    }

    /// Advance the clock by `delta`, processing everything due on the way.
    pub fn advance(&mut self, delta: Duration) {
        self.run_until(self.now.saturating_add(delta));
    }

    /// Process scheduled items until none remain.
    pub fn run_until_idle(&mut self) {
        let mut steps = 0u64;
        while self.step() {
            steps += 1;
            if steps >= MAX_IDLE_STEPS {
                warn!(steps, pending = self.queue.len(), "Simulation did not go idle");
                break;
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════════════

    fn deliver(&mut self, event: Event) {
        trace!(now = ?self.now, event = event.type_name(), "Delivering event");
        if matches!(event, Event::HeadMutated { .. }) {
            self.stats.mutations_delivered += 1;
        }
        self.stats.events_processed += 1;

        self.coordinator.set_time(self.now);
        let actions = self.coordinator.handle(event);
        self.process_actions(actions);
    }

    fn process_actions(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::SetTimer { id, duration } => {
                    if let Some(old) = self.timers.remove(&id) {
                        self.queue.remove(&old);
                    }
                    let key = self.queue.push(
                        self.now.saturating_add(duration),
                        Scheduled::Deliver(Event::Timer(id)),
                    );
                    self.timers.insert(id, key);
                }
                Action::CancelTimer { id } => {
                    if let Some(old) = self.timers.remove(&id) {
                        self.queue.remove(&old);
                    }
                }
                Action::ObserveHead => {
                    // An observer only sees insertions made after it attaches
                    self.coordinator.document_mut().take_insertions();
                    self.observing = true;
                }
                Action::DisconnectObserver => {
                    self.observing = false;
                }
                Action::ScriptInjected { handle, src } => {
                    self.injected.push((handle, src));
                    self.schedule_bootstrap(handle);
                }
                Action::EmitLoadState(state) => {
                    self.notifications.push(state);
                }
            }
        }
    }

    fn schedule_bootstrap(&mut self, handle: ScriptHandle) {
        let Some(latency) = self.resource.load_latency else {
            debug!(%handle, "External resource never loads");
            return;
        };

        let jitter_ms = u64::try_from(self.resource.jitter.as_millis()).unwrap_or(u64::MAX);
        let extra = if jitter_ms > 0 {
            Duration::from_millis(self.rng.gen_range(0..=jitter_ms))
        } else {
            Duration::ZERO
        };

        let at = self.now.saturating_add(latency).saturating_add(extra);
        self.queue.push(at, Scheduled::Bootstrap { handle });
    }

    fn run_bootstrap(&mut self, handle: ScriptHandle) {
        let attached = self
            .coordinator
            .document()
            .scripts()
            .iter()
            .any(|script| script.handle == handle);
        if !attached {
            // Removed before its download finished; a detached script never runs
            debug!(%handle, "Skipping bootstrap of detached script");
            return;
        }

        self.stats.bootstraps_run += 1;

        let follow_on = self.resource.follow_on_scripts.clone();
        if !follow_on.is_empty() {
            self.inject_scripts(follow_on);
        }

        let warnings = self.resource.bootstrap_warnings.clone();
        for message in &warnings {
            self.emit_warning(message);
        }

        if !self.resource.fires_callback {
            return;
        }
        let event = match &self.coordinator.config().callback {
            CallbackMode::Element => Event::ScriptLoaded { handle },
            CallbackMode::Global { name } => Event::GlobalCallbackInvoked { name: name.clone() },
        };
        self.queue.push(self.now, Scheduled::Deliver(event));
    }

    /// Deliver pending insertions to an attached observer as one batch.
    fn flush_mutations(&mut self) {
        let inserted = self.coordinator.document_mut().take_insertions();
        if self.observing && inserted > 0 {
            self.queue.push(
                self.now,
                Scheduled::Deliver(Event::HeadMutated { inserted }),
            );
        }
    }
}

impl std::fmt::Debug for SimulationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationRunner")
            .field("now", &self.now)
            .field("coordinator", &self.coordinator)
            .field("pending", &self.queue.len())
            .field("observing", &self.observing)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
