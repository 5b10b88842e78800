//! Scripted behaviour of the external resource.

use std::time::Duration;

/// What the external script does once it has been injected.
///
/// Models the third-party bootstrap: after a download latency it executes,
/// appends its own follow-on scripts to the head, emits warnings through the
/// host's warning channel, and finally fires its completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalResource {
    /// Download latency before the script executes. `None` means the
    /// download never completes.
    pub load_latency: Option<Duration>,

    /// Upper bound of uniformly distributed extra latency.
    pub jitter: Duration,

    /// Scripts the bootstrap appends, as one insertion batch.
    pub follow_on_scripts: Vec<String>,

    /// Warnings the bootstrap emits after appending its scripts.
    pub bootstrap_warnings: Vec<String>,

    /// Whether the bootstrap reports completion at all.
    pub fires_callback: bool,
}

impl ExternalResource {
    /// A resource that loads after `latency` and does nothing else noteworthy.
    pub fn quiet(latency: Duration) -> Self {
        Self {
            load_latency: Some(latency),
            jitter: Duration::ZERO,
            follow_on_scripts: vec![],
            bootstrap_warnings: vec![],
            fires_callback: true,
        }
    }

    /// A resource whose download never completes.
    pub fn unreachable() -> Self {
        Self {
            load_latency: None,
            fires_callback: false,
            ..Self::quiet(Duration::ZERO)
        }
    }

    /// Append follow-on scripts when the bootstrap runs.
    pub fn with_follow_on_scripts<I, S>(mut self, scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.follow_on_scripts = scripts.into_iter().map(Into::into).collect();
        self
    }

    /// Emit warnings when the bootstrap runs.
    pub fn with_bootstrap_warnings<I, S>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bootstrap_warnings = warnings.into_iter().map(Into::into).collect();
        self
    }

    /// Add random extra latency of up to `jitter`.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Never fire the completion callback.
    pub fn without_callback(mut self) -> Self {
        self.fires_callback = false;
        self
    }
}

impl Default for ExternalResource {
    fn default() -> Self {
        Self::quiet(Duration::from_millis(200))
    }
}
