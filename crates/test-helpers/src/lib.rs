//! Shared fixtures for loader tests.

use maploader_diagnostics::{RecordingSink, WarningChannel};
use maploader_host::{Document, InMemoryDocument, InMemoryGlobals, NewScript};
use maploader_loader::{LoadCoordinator, LoaderConfig};
use maploader_types::{Library, LibrarySet};

/// Resource key used throughout the tests.
pub const TEST_RESOURCE_KEY: &str = "1234567";

/// Scripts the real bootstrap appends after the loader script runs.
pub const FOLLOW_ON_SCRIPTS: [&str; 3] = [
    "https://maps.googleapis.com/maps-api-v3/api/js/55/11/intl/id_ALL/common.js",
    "https://maps.googleapis.com/maps-api-v3/api/js/55/11/intl/id_ALL/util.js",
    "https://maps.googleapis.com/maps-api-v3/api/js/55/11/intl/id_ALL/map.js",
];

/// Loader script URL for `load_script("id", "ID")` with [`test_config`].
pub const EXPECTED_ID_URL: &str =
    "https://maps.googleapis.com/maps/api/js?key=1234567&w=weekly&region=ID&language=id&libraries=places";

/// Default config with the test key and the `places` library.
pub fn test_config() -> LoaderConfig {
    LoaderConfig::new(TEST_RESOURCE_KEY, LibrarySet::from([Library::Places]))
}

/// Initial contents of the host.
#[derive(Debug, Default)]
pub struct HostSetup {
    /// Scripts already attached before the coordinator is created.
    pub scripts: Vec<String>,
    /// `(namespace, property)` pairs already defined on the host globals.
    pub globals: Vec<(String, String)>,
}

impl HostSetup {
    /// Start with a document that already holds the follow-on scripts, as
    /// after a previous load.
    pub fn with_previous_load() -> Self {
        Self {
            scripts: FOLLOW_ON_SCRIPTS.iter().map(|s| s.to_string()).collect(),
            globals: vec![("google".to_string(), "maps".to_string())],
        }
    }
}

/// Build a coordinator over in-memory hosts and a recording warning sink.
///
/// Panics if `config` is invalid.
pub fn make_coordinator(config: LoaderConfig, setup: HostSetup) -> (LoadCoordinator, RecordingSink) {
    let mut document = InMemoryDocument::new();
    for src in setup.scripts {
        document.append_script(NewScript::with_src(src));
    }

    let mut globals = InMemoryGlobals::new();
    for (namespace, property) in &setup.globals {
        globals.define(namespace, property);
    }

    let sink = RecordingSink::new();
    let coordinator = LoadCoordinator::new(
        config,
        Box::new(document),
        Box::new(globals),
        WarningChannel::new(Box::new(sink.clone())),
    )
    .expect("test config should be valid");

    (coordinator, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_load_setup() {
        let (coordinator, sink) = make_coordinator(test_config(), HostSetup::with_previous_load());

        let scripts = coordinator.document().scripts();
        assert_eq!(scripts.len(), FOLLOW_ON_SCRIPTS.len());
        assert_eq!(coordinator.registry().count(coordinator.document()), 3);
        assert!(coordinator.globals().has_property("google", "maps"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_default_setup_is_empty() {
        let (coordinator, _) = make_coordinator(test_config(), HostSetup::default());
        assert!(coordinator.document().scripts().is_empty());
        assert!(!coordinator.globals().has_property("google", "maps"));
    }
}
