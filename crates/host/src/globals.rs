//! Host global object capability and instance reset.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// The host global object that third-party library code populates.
///
/// The loader only ever checks for and deletes properties; it never reads
/// their contents.
pub trait HostGlobals {
    /// Check if `namespace.property` is defined.
    fn has_property(&self, namespace: &str, property: &str) -> bool;

    /// Delete `namespace.property`. Returns false if it was not defined.
    fn delete_property(&mut self, namespace: &str, property: &str) -> bool;
}

/// Globals backed by an in-process map of namespace to property names.
#[derive(Debug, Default)]
pub struct InMemoryGlobals {
    namespaces: HashMap<String, BTreeSet<String>>,
}

impl InMemoryGlobals {
    /// Create an empty global object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `namespace.property`, as the library's bootstrap would.
    pub fn define(&mut self, namespace: &str, property: &str) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(property.to_string());
    }

    /// Check if the namespace object itself exists.
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }
}

impl HostGlobals for InMemoryGlobals {
    fn has_property(&self, namespace: &str, property: &str) -> bool {
        self.namespaces
            .get(namespace)
            .is_some_and(|props| props.contains(property))
    }

    fn delete_property(&mut self, namespace: &str, property: &str) -> bool {
        // The namespace object survives with no properties, as it would on a
        // real global.
        self.namespaces
            .get_mut(namespace)
            .is_some_and(|props| props.remove(property))
    }
}

/// Remove a previously initialized library entry point.
///
/// Must run before every injection so that nobody checking whether the
/// library is initialized can see the stale instance between removal of the
/// old scripts and completion of the new load. Absent namespaces and
/// properties are fine. Returns whether anything was removed.
pub fn clear_library_handle(globals: &mut dyn HostGlobals, namespace: &str, property: &str) -> bool {
    let cleared = globals.delete_property(namespace, property);
    if cleared {
        debug!(namespace, property, "Cleared stale library handle");
    }
    cleared
}
