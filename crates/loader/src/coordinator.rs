//! The load coordinator state machine.

use crate::{script_url, CallbackMode, ConfigError, LoadError, LoaderConfig};
use maploader_core::{Action, Event, StateMachine, TimerId};
use maploader_diagnostics::WarningChannel;
use maploader_host::{clear_library_handle, Document, HostGlobals, NewScript, ScriptRegistry};
use maploader_types::{LoadCycle, LoadPhase, LoadRequest, LoadState, ReloadVerdict, ScriptHandle};
use maploader_watcher::{CompletionWatcher, WatchStep, WatcherConfig, DEFAULT_MAX_ATTEMPTS};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Coordinates loading of the external maps script.
///
/// Owns the in-flight guard and the two outcome flags. Host capabilities are
/// injected at construction and mutated synchronously from inside
/// [`load_script`](Self::load_script), so the guard check, the removal of
/// stale scripts, the instance reset and the injection happen as one step.
///
/// ```text
///            load_script (accepted)
///   Idle ─────────────────────────────▶ Loading
///    ▲                                     │ load_script → Err(InFlight)
///    │        Settle timer                 │ ScriptLoaded → is_ready
///    └─────────────────────────────────────┘ watcher verdict → reload_detected
/// ```
pub struct LoadCoordinator {
    config: LoaderConfig,
    registry: ScriptRegistry,

    document: Box<dyn Document>,
    globals: Box<dyn HostGlobals>,
    warnings: WarningChannel,

    phase: LoadPhase,
    is_ready: bool,
    reload_detected: bool,

    /// Cycle of the most recently accepted load.
    cycle: LoadCycle,
    /// Element injected by the most recent load.
    current_script: Option<ScriptHandle>,
    /// Reload detector, until it reaches a verdict.
    watcher: Option<CompletionWatcher>,
    /// A verdict was reached and the settle timer is pending.
    settling: bool,

    now: Duration,
}

impl LoadCoordinator {
    /// Create a coordinator over the given host capabilities.
    pub fn new(
        config: LoaderConfig,
        document: Box<dyn Document>,
        globals: Box<dyn HostGlobals>,
        warnings: WarningChannel,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = ScriptRegistry::new(config.script_prefix.clone());

        Ok(Self {
            config,
            registry,
            document,
            globals,
            warnings,
            phase: LoadPhase::Idle,
            is_ready: false,
            reload_detected: false,
            cycle: LoadCycle::NONE,
            current_script: None,
            watcher: None,
            settling: false,
            now: Duration::ZERO,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════════

    /// Snapshot of the externally visible flags.
    pub fn state(&self) -> LoadState {
        LoadState {
            in_flight: self.phase.is_in_flight(),
            is_ready: self.is_ready,
            reload_detected: self.reload_detected,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Whether a load is in flight.
    pub fn is_in_flight(&self) -> bool {
        self.phase.is_in_flight()
    }

    /// Whether the injected script reported completion.
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Whether the watcher observed follow-on scripts.
    pub fn reload_detected(&self) -> bool {
        self.reload_detected
    }

    /// Cycle of the most recently accepted load.
    pub fn cycle(&self) -> LoadCycle {
        self.cycle
    }

    /// Element injected by the most recently accepted load.
    pub fn current_script(&self) -> Option<ScriptHandle> {
        self.current_script
    }

    /// Whether a watcher is still waiting for its verdict.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn document(&self) -> &dyn Document {
        self.document.as_ref()
    }

    pub fn document_mut(&mut self) -> &mut dyn Document {
        self.document.as_mut()
    }

    pub fn globals(&self) -> &dyn HostGlobals {
        self.globals.as_ref()
    }

    pub fn globals_mut(&mut self) -> &mut dyn HostGlobals {
        self.globals.as_mut()
    }

    /// The warning channel the host and the external resource emit through.
    pub fn warnings_mut(&mut self) -> &mut WarningChannel {
        &mut self.warnings
    }

    pub fn warnings(&self) -> &WarningChannel {
        &self.warnings
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Public API
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start loading the script for a language and region.
    ///
    /// Refused with [`LoadError::InFlight`] while a previous load has not
    /// settled. A refused call has no effect at all.
    pub fn load_script(&mut self, locale: &str, region: &str) -> Result<Vec<Action>, LoadError> {
        if self.phase.is_in_flight() {
            debug!(cycle = %self.cycle, locale, region, "Load rejected: already in flight");
            return Err(LoadError::InFlight { cycle: self.cycle });
        }

        self.phase = LoadPhase::Loading;
        self.cycle = self.cycle.next();
        self.is_ready = false;
        self.reload_detected = false;

        // A manual poll run may still be armed from the previous cycle
        let mut actions = self.stop_watching();

        let removed = self.registry.remove_all(self.document.as_mut());
        if removed > 0 {
            self.warnings.arm();
        }

        clear_library_handle(
            self.globals.as_mut(),
            &self.config.namespace,
            &self.config.library_property,
        );

        let request = LoadRequest::new(
            self.config.resource_key.clone(),
            locale,
            region,
            self.config.libraries.clone(),
        );
        let src = script_url(&self.config.endpoint, &request, &self.config.callback).to_string();

        let handle = self.document.append_script(NewScript {
            id: Some(self.config.script_id.clone()),
            script_type: Some(self.config.script_type.clone()),
            src: src.clone(),
            is_async: true,
            defer: true,
        });
        self.current_script = Some(handle);

        info!(
            cycle = %self.cycle,
            %handle,
            locale,
            region,
            removed,
            "Load accepted"
        );

        actions.push(Action::ScriptInjected { handle, src });

        if let Some(watcher_config) = self.config.watcher {
            let (watcher, watcher_actions) = CompletionWatcher::start(watcher_config);
            self.watcher = Some(watcher);
            actions.extend(watcher_actions);
        }

        actions.push(Action::EmitLoadState(self.state()));
        Ok(actions)
    }

    /// Run the polling watcher with explicit starting conditions.
    ///
    /// Replaces whatever watcher is armed. The verdict updates
    /// `reload_detected` and releases the in-flight guard after the settle
    /// delay, like a poll started by [`load_script`](Self::load_script).
    ///
    /// # Arguments
    ///
    /// * `retry` - Attempts to consider already spent
    /// * `interval` - Time between polls
    /// * `initial_count` - Matching-script count to treat as already observed
    pub fn check_all_scripts(
        &mut self,
        retry: u32,
        interval: Duration,
        initial_count: usize,
    ) -> Vec<Action> {
        let mut actions = self.stop_watching();

        let max_attempts = match self.config.watcher {
            Some(WatcherConfig::Polled { max_attempts, .. }) => max_attempts,
            _ => DEFAULT_MAX_ATTEMPTS,
        };

        debug!(retry, ?interval, initial_count, max_attempts, "Manual script check started");

        let (watcher, watcher_actions) =
            CompletionWatcher::start_polling_at(interval, max_attempts, retry, initial_count);
        self.watcher = Some(watcher);
        actions.extend(watcher_actions);
        actions
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Event Handlers
    // ═══════════════════════════════════════════════════════════════════════════

    fn on_script_loaded(&mut self, handle: ScriptHandle) -> Vec<Action> {
        if self.config.callback != CallbackMode::Element {
            trace!(%handle, "Element load ignored in global callback mode");
            return vec![];
        }
        if self.current_script != Some(handle) {
            debug!(%handle, current = ?self.current_script, "Ignoring load of stale script");
            return vec![];
        }
        self.mark_ready()
    }

    fn on_global_callback(&mut self, name: &str) -> Vec<Action> {
        match &self.config.callback {
            CallbackMode::Global { name: expected } if expected == name => {}
            _ => {
                debug!(name, "Ignoring unknown global callback");
                return vec![];
            }
        }
        if self.current_script.is_none() {
            debug!(name, "Global callback before any load");
            return vec![];
        }
        self.mark_ready()
    }

    fn mark_ready(&mut self) -> Vec<Action> {
        if self.is_ready {
            return vec![];
        }
        self.is_ready = true;
        info!(cycle = %self.cycle, "Script ready");

        // Without a watcher the completion callback is the only terminal signal
        if self.config.watcher.is_none() && self.phase.is_in_flight() {
            self.phase = LoadPhase::Idle;
            debug!(cycle = %self.cycle, "In-flight guard released by completion callback");
        }

        vec![Action::EmitLoadState(self.state())]
    }

    fn on_poll_timer(&mut self) -> Vec<Action> {
        let observed = self.registry.count(self.document.as_ref());
        match self.watcher.as_mut() {
            Some(watcher) => {
                let step = watcher.on_poll(observed);
                self.apply_step(step)
            }
            None => vec![],
        }
    }

    fn on_head_mutated(&mut self, inserted: usize) -> Vec<Action> {
        let observed = self.registry.count(self.document.as_ref());
        trace!(inserted, observed, "Head mutation batch");
        match self.watcher.as_mut() {
            Some(watcher) => {
                let step = watcher.on_mutation(observed);
                self.apply_step(step)
            }
            None => vec![],
        }
    }

    fn on_observation_deadline(&mut self) -> Vec<Action> {
        match self.watcher.as_mut() {
            Some(watcher) => {
                let step = watcher.on_deadline();
                self.apply_step(step)
            }
            None => vec![],
        }
    }

    fn on_settle_timer(&mut self) -> Vec<Action> {
        if !self.settling {
            return vec![];
        }
        self.settling = false;

        if self.phase.is_in_flight() {
            self.phase = LoadPhase::Idle;
        }
        info!(
            cycle = %self.cycle,
            is_ready = self.is_ready,
            reload_detected = self.reload_detected,
            "Load settled"
        );
        vec![Action::EmitLoadState(self.state())]
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════════════

    /// Apply a watcher step, interpreting a verdict if it carries one.
    fn apply_step(&mut self, step: WatchStep) -> Vec<Action> {
        let mut actions = step.actions;

        if let Some(verdict) = step.verdict {
            self.watcher = None;
            actions.extend(self.on_verdict(verdict));
        }
        actions
    }

    fn on_verdict(&mut self, verdict: ReloadVerdict) -> Vec<Action> {
        self.reload_detected = verdict.is_reloaded();
        self.settling = true;

        info!(cycle = %self.cycle, ?verdict, "Reload verdict reached");

        vec![
            Action::EmitLoadState(self.state()),
            Action::SetTimer {
                id: TimerId::Settle,
                duration: self.config.settle_delay,
            },
        ]
    }

    /// Tear down any armed watcher and pending settle.
    fn stop_watching(&mut self) -> Vec<Action> {
        let mut actions = vec![];
        if let Some(mut watcher) = self.watcher.take() {
            actions.extend(watcher.stop());
        }
        if self.settling {
            self.settling = false;
            actions.push(Action::CancelTimer { id: TimerId::Settle });
        }
        actions
    }
}

impl StateMachine for LoadCoordinator {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        trace!(event = event.type_name(), now = ?self.now, "Handling event");
        match event {
            Event::ScriptLoaded { handle } => self.on_script_loaded(handle),
            Event::GlobalCallbackInvoked { name } => self.on_global_callback(&name),
            Event::HeadMutated { inserted } => self.on_head_mutated(inserted),
            Event::Timer(TimerId::ScriptPoll) => self.on_poll_timer(),
            Event::Timer(TimerId::ObservationDeadline) => self.on_observation_deadline(),
            Event::Timer(TimerId::Settle) => self.on_settle_timer(),
        }
    }

    fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    fn now(&self) -> Duration {
        self.now
    }
}

impl std::fmt::Debug for LoadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCoordinator")
            .field("phase", &self.phase)
            .field("is_ready", &self.is_ready)
            .field("reload_detected", &self.reload_detected)
            .field("cycle", &self.cycle)
            .field("current_script", &self.current_script)
            .field("watcher", &self.watcher)
            .field("settling", &self.settling)
            .finish_non_exhaustive()
    }
}
