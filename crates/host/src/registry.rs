//! Queries over the scripts that belong to the external resource.
//!
//! A script belongs to the resource when its source URL starts with the
//! configured prefix. That covers the loader script this crate injects and
//! any follow-on scripts the resource's own bootstrap appends afterwards.
//! Every query is recomputed against the live document.

use crate::{Document, ScriptElement};
use maploader_types::ScriptHandle;
use tracing::debug;

/// Live view of the matching scripts in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRegistry {
    prefix: String,
}

impl ScriptRegistry {
    /// Create a registry matching sources that start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The URL prefix this registry matches.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check if a source URL belongs to the external resource.
    pub fn matches(&self, src: &str) -> bool {
        src.starts_with(&self.prefix)
    }

    /// All matching scripts, in document order.
    pub fn find_matching(&self, document: &dyn Document) -> Vec<ScriptElement> {
        document
            .scripts()
            .into_iter()
            .filter(|script| self.matches(&script.src))
            .collect()
    }

    /// Remove every matching script. Returns how many were removed.
    pub fn remove_all(&self, document: &mut dyn Document) -> usize {
        let handles: Vec<ScriptHandle> = self
            .find_matching(document)
            .into_iter()
            .map(|script| script.handle)
            .collect();

        let removed = handles
            .into_iter()
            .filter(|&handle| document.remove_script(handle))
            .count();

        if removed > 0 {
            debug!(removed, prefix = %self.prefix, "Removed existing scripts");
        }
        removed
    }

    /// Number of matching scripts.
    pub fn count(&self, document: &dyn Document) -> usize {
        document
            .scripts()
            .iter()
            .filter(|script| self.matches(&script.src))
            .count()
    }
}
