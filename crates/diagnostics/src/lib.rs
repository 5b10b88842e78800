//! Warning channel with bounded suppression.
//!
//! Reloading the external resource makes its bootstrap emit one or two benign
//! warnings. The [`WarningChannel`] can be armed just before such a reload so
//! that burst is swallowed, after which it restores pass-through on its own.
//!
//! # Interception policy
//!
//! ```text
//! arm()
//!   warn #1  → swallowed            (intercepted = 1)
//!   warn #2  → swallowed, restored  (intercepted = 0)
//!   warn #3+ → delivered to the sink
//! ```
//!
//! Restoration is bounded by call count rather than by scope exit, because the
//! warnings arrive asynchronously after the load call has returned.

mod sink;

pub use sink::{DiagnosticSink, RecordingSink, TracingSink};

use tracing::debug;

/// Number of intercepted calls after which the interceptor removes itself.
pub const SUPPRESSION_LIMIT: u32 = 2;

/// Interceptor installed in front of the sink while armed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Interceptor {
    intercepted: u32,
}

/// The process-wide warning emission point, made injectable.
pub struct WarningChannel {
    sink: Box<dyn DiagnosticSink>,
    interceptor: Option<Interceptor>,
}

impl WarningChannel {
    /// Create a channel that delivers to `sink`.
    pub fn new(sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            sink,
            interceptor: None,
        }
    }

    /// Create a channel that delivers to `tracing`.
    pub fn tracing() -> Self {
        Self::new(Box::new(TracingSink))
    }

    /// Install the interceptor.
    ///
    /// Arming an already armed channel keeps the current count, so the total
    /// number of swallowed warnings stays bounded.
    pub fn arm(&mut self) {
        if self.interceptor.is_none() {
            debug!("Warning suppression armed");
            self.interceptor = Some(Interceptor::default());
        }
    }

    /// Whether the interceptor is installed.
    pub fn is_armed(&self) -> bool {
        self.interceptor.is_some()
    }

    /// Calls intercepted since the interceptor was installed.
    pub fn intercepted_count(&self) -> u32 {
        self.interceptor.map_or(0, |i| i.intercepted)
    }

    /// Emit a warning.
    pub fn warn(&mut self, message: &str) {
        let Some(interceptor) = self.interceptor.as_mut() else {
            self.sink.warn(message);
            return;
        };

        interceptor.intercepted += 1;
        if interceptor.intercepted >= SUPPRESSION_LIMIT {
            debug!(
                intercepted = interceptor.intercepted,
                "Warning suppression released"
            );
            self.interceptor = None;
        }
    }
}

impl std::fmt::Debug for WarningChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarningChannel")
            .field("interceptor", &self.interceptor)
            .finish_non_exhaustive()
    }
}

impl Default for WarningChannel {
    fn default() -> Self {
        Self::tracing()
    }
}
