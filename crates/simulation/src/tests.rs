//! End-to-end load cycles.

use crate::{ExternalResource, SimulationRunner};
use maploader_core::TimerId;
use maploader_loader::CallbackMode;
use maploader_test_helpers::{
    make_coordinator, test_config, HostSetup, EXPECTED_ID_URL, FOLLOW_ON_SCRIPTS,
};
use maploader_types::LoadState;
use maploader_watcher::WatcherConfig;
use std::time::Duration;
use tracing_test::traced_test;

const SEED: u64 = 12345;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn reloading_resource() -> ExternalResource {
    ExternalResource::quiet(ms(200)).with_follow_on_scripts(FOLLOW_ON_SCRIPTS)
}

fn runner(resource: ExternalResource) -> SimulationRunner {
    let (coordinator, _) = make_coordinator(test_config(), HostSetup::default());
    SimulationRunner::new(coordinator, resource, SEED)
}

fn matching_count(runner: &SimulationRunner) -> usize {
    let coordinator = runner.coordinator();
    coordinator.registry().count(coordinator.document())
}

#[test]
fn test_full_cycle_with_reload() {
    let mut runner = runner(reloading_resource());

    assert!(runner.load_script("id", "ID"));
    assert_eq!(runner.injected().len(), 1);
    assert_eq!(runner.injected()[0].1, EXPECTED_ID_URL);

    runner.run_until_idle();

    let coordinator = runner.coordinator();
    assert!(coordinator.is_ready());
    assert!(coordinator.reload_detected());
    assert!(!coordinator.is_in_flight());
    assert_eq!(matching_count(&runner), 4);

    // First poll at 1s sees the follow-on scripts, settle 60ms later
    assert_eq!(runner.now(), ms(1060));
    assert_eq!(
        runner.notifications().last(),
        Some(&LoadState {
            in_flight: false,
            is_ready: true,
            reload_detected: true,
        })
    );
}

#[traced_test]
#[test]
fn test_rapid_loads_only_first_mutates() {
    let mut runner = runner(reloading_resource());

    assert!(runner.load_script("id", "ID"));
    let scripts = runner.coordinator().document().scripts();

    for _ in 0..5 {
        assert!(!runner.load_script("en", "US"));
    }

    assert_eq!(runner.coordinator().document().scripts(), scripts);
    assert_eq!(runner.injected().len(), 1);
    assert_eq!(runner.stats().loads_accepted, 1);
    assert_eq!(runner.stats().loads_rejected, 5);
    assert!(logs_contain("Load refused"));

    // Still rejected mid-flight, after the bootstrap ran
    runner.run_until(ms(500));
    assert!(runner.coordinator().is_ready());
    assert!(!runner.load_script("en", "US"));

    runner.run_until_idle();
    assert!(runner.load_script("en", "US"));
}

#[test]
fn test_poll_detects_threshold_within_k_intervals() {
    for k in 1..7u64 {
        let mut runner = runner(ExternalResource::unreachable());
        runner.check_all_scripts(0, ms(1), 0);

        runner.run_until(ms(k - 1));
        assert!(!runner.coordinator().reload_detected(), "k={k}");

        runner.inject_scripts(FOLLOW_ON_SCRIPTS);
        runner.run_until(ms(k));
        assert!(runner.coordinator().reload_detected(), "k={k}");
        assert!(!runner.has_timer(TimerId::ScriptPoll));
    }
}

#[test]
fn test_poll_at_ceiling_stays_negative() {
    let mut runner = runner(ExternalResource::unreachable());
    runner.inject_scripts([FOLLOW_ON_SCRIPTS[0]]);
    runner.check_all_scripts(7, ms(1), 0);

    runner.run_until_idle();
    assert!(!runner.coordinator().reload_detected());
    assert_eq!(runner.now(), ms(61));
}

#[test]
fn test_unreachable_resource_does_not_lock_out() {
    let mut runner = runner(ExternalResource::unreachable());
    assert!(runner.load_script("id", "ID"));

    runner.run_until_idle();
    let coordinator = runner.coordinator();
    assert!(!coordinator.is_ready());
    assert!(!coordinator.reload_detected());
    assert!(!coordinator.is_in_flight());
    assert_eq!(runner.now(), ms(7060));
    assert_eq!(runner.stats().timers_fired, 8);

    assert!(runner.load_script("id", "ID"));
}

#[test]
fn test_reload_swallows_bootstrap_warnings() {
    let (coordinator, sink) = make_coordinator(test_config(), HostSetup::default());
    let resource = reloading_resource().with_bootstrap_warnings(["first", "second"]);
    let mut runner = SimulationRunner::new(coordinator, resource, SEED);

    // Nothing to remove on the first load, so nothing is suppressed
    runner.load_script("id", "ID");
    runner.run_until_idle();
    assert_eq!(sink.messages(), vec!["first", "second"]);

    // The second load removes four scripts and arms suppression
    runner.load_script("en", "US");
    assert!(runner.coordinator().warnings().is_armed());
    runner.run_until_idle();
    assert!(!runner.coordinator().warnings().is_armed());

    runner.emit_warning("genuine");
    assert_eq!(sink.messages(), vec!["first", "second", "genuine"]);
}

#[test]
fn test_event_driven_cycle() {
    let config = test_config().with_watcher(WatcherConfig::event_driven());
    let (coordinator, _) = make_coordinator(config, HostSetup::default());
    let mut runner = SimulationRunner::new(coordinator, reloading_resource(), SEED);

    runner.load_script("id", "ID");
    assert!(runner.is_observing());

    runner.run_until_idle();
    let coordinator = runner.coordinator();
    assert!(coordinator.is_ready());
    assert!(coordinator.reload_detected());
    assert!(!coordinator.is_in_flight());
    assert!(!runner.is_observing());
    assert_eq!(runner.stats().mutations_delivered, 1);
    assert_eq!(runner.now(), ms(260));
}

#[test]
fn test_event_driven_window_elapses() {
    let config = test_config().with_watcher(WatcherConfig::EventDriven {
        max_observation: ms(3000),
    });
    let (coordinator, _) = make_coordinator(config, HostSetup::default());
    let mut runner = SimulationRunner::new(coordinator, ExternalResource::quiet(ms(200)), SEED);

    runner.load_script("id", "ID");
    runner.run_until_idle();

    let coordinator = runner.coordinator();
    assert!(coordinator.is_ready());
    assert!(!coordinator.reload_detected());
    assert!(!coordinator.is_in_flight());
    assert_eq!(runner.now(), ms(3060));
}

#[test]
fn test_global_callback_cycle() {
    let config = test_config().with_callback(CallbackMode::global());
    let (coordinator, _) = make_coordinator(config, HostSetup::default());
    let mut runner = SimulationRunner::new(coordinator, reloading_resource(), SEED);

    runner.load_script("id", "ID");
    assert_eq!(
        runner.injected()[0].1,
        format!("{EXPECTED_ID_URL}&loading=async&callback=initMap")
    );

    runner.run_until(ms(200));
    assert!(runner.coordinator().is_ready());
    assert!(!runner.coordinator().reload_detected());
}

#[test]
fn test_previous_instance_cleared_on_reload() {
    let (coordinator, _) = make_coordinator(test_config(), HostSetup::with_previous_load());
    let mut runner = SimulationRunner::new(coordinator, reloading_resource(), SEED);

    assert!(runner.coordinator().globals().has_property("google", "maps"));
    assert_eq!(matching_count(&runner), 3);

    runner.load_script("id", "ID");
    assert!(!runner.coordinator().globals().has_property("google", "maps"));
    assert_eq!(matching_count(&runner), 1);
    assert!(!runner.coordinator().is_ready());
}

#[test]
fn test_script_removed_before_download_never_runs() {
    let mut runner = runner(ExternalResource::quiet(ms(10_000)));

    runner.load_script("id", "ID");
    runner.run_until(ms(7060));
    assert!(!runner.coordinator().is_in_flight());

    runner.load_script("id", "ID");
    runner.run_until_idle();

    assert_eq!(runner.stats().bootstraps_run, 1);
    assert!(runner.coordinator().is_ready());
    assert_eq!(runner.injected().len(), 2);
}

#[test]
fn test_callback_only_config() {
    let config = test_config().without_watcher();
    let (coordinator, _) = make_coordinator(config, HostSetup::default());
    let mut runner = SimulationRunner::new(coordinator, ExternalResource::quiet(ms(50)), SEED);

    runner.load_script("id", "ID");
    runner.run_until_idle();

    assert_eq!(
        runner.notifications(),
        &[
            LoadState {
                in_flight: true,
                is_ready: false,
                reload_detected: false,
            },
            LoadState {
                in_flight: false,
                is_ready: true,
                reload_detected: false,
            },
        ]
    );
    assert_eq!(runner.now(), ms(50));
}

#[test]
fn test_same_seed_same_timeline() {
    let run = |seed| {
        let config = test_config().with_watcher(WatcherConfig::event_driven());
        let (coordinator, _) = make_coordinator(config, HostSetup::default());
        let resource = reloading_resource().with_jitter(ms(500));
        let mut runner = SimulationRunner::new(coordinator, resource, seed);
        runner.load_script("id", "ID");
        runner.run_until_idle();
        runner.now()
    };

    let first = run(SEED);
    assert_eq!(first, run(SEED));
    assert!(first >= ms(260) && first <= ms(760));
}

#[test]
fn test_unbounded_durations_saturate() {
    let config = test_config()
        .with_watcher(WatcherConfig::EventDriven {
            max_observation: Duration::MAX,
        })
        .with_settle_delay(Duration::MAX);
    assert_eq!(config.validate(), Ok(()));
    let (coordinator, _) = make_coordinator(config, HostSetup::default());
    let mut runner = SimulationRunner::new(coordinator, ExternalResource::quiet(ms(200)), SEED);

    assert!(runner.load_script("id", "ID"));
    runner.run_until_idle();
    assert!(runner.coordinator().is_ready());
    assert!(!runner.coordinator().is_in_flight());
    assert_eq!(runner.now(), Duration::MAX);

    let config = test_config().with_watcher(WatcherConfig::Polled {
        interval: Duration::MAX,
        max_attempts: 7,
    });
    let (coordinator, _) = make_coordinator(config, HostSetup::default());
    let resource = ExternalResource::quiet(Duration::MAX).with_jitter(Duration::MAX);
    let mut runner = SimulationRunner::new(coordinator, resource, SEED);

    assert!(runner.load_script("id", "ID"));
    runner.run_until_idle();
    assert!(runner.coordinator().is_ready());
    assert!(!runner.coordinator().is_in_flight());
    assert_eq!(runner.stats().timers_fired, 8);
    assert_eq!(runner.stats().bootstraps_run, 1);
}

#[test]
fn test_silent_resource_still_settles() {
    let mut runner = runner(reloading_resource().without_callback());

    runner.load_script("id", "ID");
    runner.run_until_idle();

    let coordinator = runner.coordinator();
    assert!(!coordinator.is_ready());
    assert!(coordinator.reload_detected());
    assert!(!coordinator.is_in_flight());
    assert_eq!(runner.stats().bootstraps_run, 1);
}

#[test]
fn test_resource_swapped_between_loads() {
    let mut runner = runner(ExternalResource::unreachable());

    runner.load_script("id", "ID");
    assert_eq!(runner.pending(), 1);
    runner.advance(ms(7060));
    assert!(!runner.coordinator().is_in_flight());
    assert_eq!(runner.pending(), 0);

    runner.set_resource(reloading_resource());
    runner.load_script("id", "ID");
    assert_eq!(runner.pending(), 2);

    runner.advance(ms(1060));
    let coordinator = runner.coordinator();
    assert!(coordinator.is_ready());
    assert!(coordinator.reload_detected());
    assert!(!coordinator.is_in_flight());
    assert_eq!(runner.now(), ms(8120));
}
