//! Loader configuration.

use maploader_types::LibrarySet;
use maploader_watcher::WatcherConfig;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Base endpoint of the maps JavaScript API.
pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/js";

/// Prefix shared by the loader script and every script it bootstraps.
pub const DEFAULT_SCRIPT_PREFIX: &str = "https://maps.googleapis.com";

/// Default name of the global completion callback.
pub const DEFAULT_GLOBAL_CALLBACK: &str = "initMap";

/// How the injected script signals that the library is ready.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallbackMode {
    /// The element's own load callback.
    #[default]
    Element,
    /// A globally reachable function named in the request URL
    /// (`loading=async&callback=<name>`).
    Global { name: String },
}

impl CallbackMode {
    /// Global callback under the default name.
    pub fn global() -> Self {
        CallbackMode::Global {
            name: DEFAULT_GLOBAL_CALLBACK.to_string(),
        }
    }
}

/// Errors in a [`LoaderConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No resource key was supplied.
    #[error("Resource key must not be empty")]
    EmptyResourceKey,

    /// The polling interval is zero.
    #[error("Poll interval must be non-zero")]
    ZeroPollInterval,

    /// The polling ceiling is zero.
    #[error("Poll attempt ceiling must be non-zero")]
    ZeroAttempts,

    /// The global callback has no name.
    #[error("Global callback name must not be empty")]
    EmptyCallbackName,

    /// The injected script would not be counted as a matching script.
    #[error("Endpoint {endpoint} does not start with script prefix {prefix}")]
    EndpointOutsidePrefix { endpoint: String, prefix: String },
}

/// Configuration for the load coordinator.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// API key sent as `key`.
    pub resource_key: String,

    /// Libraries sent as `libraries`.
    pub libraries: LibrarySet,

    /// Base URL the query string is appended to.
    pub endpoint: Url,

    /// Scripts whose source starts with this prefix belong to the resource.
    pub script_prefix: String,

    /// Id attribute of the injected element.
    pub script_id: String,

    /// Content type of the injected element.
    pub script_type: String,

    /// Host global namespace the library installs itself under.
    pub namespace: String,

    /// Property on `namespace` holding the library entry point.
    pub library_property: String,

    /// Completion signal of the injected script.
    pub callback: CallbackMode,

    /// Reload detection strategy.
    ///
    /// With `None`, the completion callback alone releases the in-flight guard.
    pub watcher: Option<WatcherConfig>,

    /// Delay between a watcher verdict and release of the in-flight guard,
    /// so a last mutation batch can land.
    pub settle_delay: Duration,
}

impl LoaderConfig {
    /// Create a configuration with default endpoint, polling and callback.
    pub fn new(resource_key: impl Into<String>, libraries: LibrarySet) -> Self {
        Self {
            resource_key: resource_key.into(),
            libraries,
            endpoint: default_endpoint(),
            script_prefix: DEFAULT_SCRIPT_PREFIX.to_string(),
            script_id: "googlemaps".to_string(),
            script_type: "text/javascript".to_string(),
            namespace: "google".to_string(),
            library_property: "maps".to_string(),
            callback: CallbackMode::Element,
            watcher: Some(WatcherConfig::polled()),
            settle_delay: Duration::from_millis(60),
        }
    }

    /// Set the base endpoint and the matching script prefix.
    pub fn with_endpoint(mut self, endpoint: Url, script_prefix: impl Into<String>) -> Self {
        self.endpoint = endpoint;
        self.script_prefix = script_prefix.into();
        self
    }

    /// Set the completion callback mode.
    pub fn with_callback(mut self, callback: CallbackMode) -> Self {
        self.callback = callback;
        self
    }

    /// Set the reload detection strategy.
    pub fn with_watcher(mut self, watcher: WatcherConfig) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Disable reload detection.
    ///
    /// The completion callback then becomes the only signal that releases
    /// the in-flight guard. If the external script never reports completion,
    /// every later load is refused.
    pub fn without_watcher(mut self) -> Self {
        self.watcher = None;
        self
    }

    /// Set the settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the host namespace and property of the library entry point.
    pub fn with_library_handle(
        mut self,
        namespace: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        self.namespace = namespace.into();
        self.library_property = property.into();
        self
    }

    /// Check the configuration for values the coordinator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resource_key.is_empty() {
            return Err(ConfigError::EmptyResourceKey);
        }

        if !self.endpoint.as_str().starts_with(&self.script_prefix) {
            return Err(ConfigError::EndpointOutsidePrefix {
                endpoint: self.endpoint.to_string(),
                prefix: self.script_prefix.clone(),
            });
        }

        if let CallbackMode::Global { name } = &self.callback {
            if name.is_empty() {
                return Err(ConfigError::EmptyCallbackName);
            }
        }

        if let Some(WatcherConfig::Polled {
            interval,
            max_attempts,
        }) = self.watcher
        {
            if interval.is_zero() {
                return Err(ConfigError::ZeroPollInterval);
            }
            if max_attempts == 0 {
                return Err(ConfigError::ZeroAttempts);
            }
        }

        Ok(())
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint should always parse")
}

#[cfg(test)]
mod tests {
    use super::*;
    use maploader_types::Library;

    fn config() -> LoaderConfig {
        LoaderConfig::new("1234567", LibrarySet::from([Library::Places]))
    }

    #[test]
    fn test_defaults_validate() {
        let config = config();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.settle_delay, Duration::from_millis(60));
        assert_eq!(config.watcher, Some(WatcherConfig::polled()));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_empty_key_rejected() {
        let config = LoaderConfig::new("", LibrarySet::new());
        assert_eq!(config.validate(), Err(ConfigError::EmptyResourceKey));
    }

    #[test]
    fn test_zero_poll_settings_rejected() {
        let zero_interval = config().with_watcher(WatcherConfig::Polled {
            interval: Duration::ZERO,
            max_attempts: 7,
        });
        assert_eq!(zero_interval.validate(), Err(ConfigError::ZeroPollInterval));

        let zero_attempts = config().with_watcher(WatcherConfig::Polled {
            interval: Duration::from_millis(1),
            max_attempts: 0,
        });
        assert_eq!(zero_attempts.validate(), Err(ConfigError::ZeroAttempts));
    }

    #[test]
    fn test_endpoint_must_match_prefix() {
        let config = config().with_endpoint(
            Url::parse("https://cdn.example.com/maps/api/js").unwrap(),
            DEFAULT_SCRIPT_PREFIX,
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EndpointOutsidePrefix { .. })
        ));
    }

    #[test]
    fn test_empty_callback_name_rejected() {
        let config = config().with_callback(CallbackMode::Global {
            name: String::new(),
        });
        assert_eq!(config.validate(), Err(ConfigError::EmptyCallbackName));
        assert_eq!(
            ConfigError::EmptyCallbackName.to_string(),
            "Global callback name must not be empty"
        );
    }
}
