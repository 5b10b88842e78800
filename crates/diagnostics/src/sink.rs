//! Diagnostic sinks.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

/// Where warnings end up when nothing intercepts them.
pub trait DiagnosticSink {
    /// Deliver a warning.
    fn warn(&mut self, message: &str);
}

/// Forwards warnings to `tracing` at WARN level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&mut self, message: &str) {
        warn!(warning = message, "Host warning");
    }
}

/// Records delivered warnings for later inspection.
///
/// Clones share the same log, so one clone can be handed to a channel while
/// another stays with the caller.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    messages: Rc<RefCell<Vec<String>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings delivered so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Number of warnings delivered so far.
    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    /// Check if nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl DiagnosticSink for RecordingSink {
    fn warn(&mut self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
