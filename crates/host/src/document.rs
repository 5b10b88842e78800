//! Host document capability.

use indexmap::IndexMap;
use maploader_types::ScriptHandle;

/// Attributes of a script element to be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScript {
    /// Element id attribute.
    pub id: Option<String>,
    /// Content type, e.g. `text/javascript`.
    pub script_type: Option<String>,
    /// Source URL.
    pub src: String,
    /// Asynchronous execution flag.
    pub is_async: bool,
    /// Deferred execution flag.
    pub defer: bool,
}

impl NewScript {
    /// A bare script with only a source URL, as injected by third-party bootstraps.
    pub fn with_src(src: impl Into<String>) -> Self {
        Self {
            id: None,
            script_type: None,
            src: src.into(),
            is_async: false,
            defer: false,
        }
    }
}

/// A script element currently attached to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptElement {
    pub handle: ScriptHandle,
    pub id: Option<String>,
    pub script_type: Option<String>,
    pub src: String,
    pub is_async: bool,
    pub defer: bool,
}

/// The slice of a host document the loader touches.
///
/// Only script elements under the head container are visible through this
/// trait. The document owns the elements; callers hold handles.
pub trait Document {
    /// Script elements currently attached, in document order.
    fn scripts(&self) -> Vec<ScriptElement>;

    /// Append a script element to the head container.
    fn append_script(&mut self, script: NewScript) -> ScriptHandle;

    /// Detach a script element. Returns false if it was not attached.
    fn remove_script(&mut self, handle: ScriptHandle) -> bool;

    /// Number of elements inserted since the previous call.
    ///
    /// This is the mutation-record queue an observer drains; it counts every
    /// insertion regardless of who made it.
    fn take_insertions(&mut self) -> usize;
}

/// Document backed by an ordered in-process map.
#[derive(Debug, Default)]
pub struct InMemoryDocument {
    scripts: IndexMap<ScriptHandle, ScriptElement>,
    next_handle: u64,
    pending_insertions: usize,
}

impl InMemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attached script.
    pub fn get(&self, handle: ScriptHandle) -> Option<&ScriptElement> {
        self.scripts.get(&handle)
    }

    /// Number of attached scripts, matching or not.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Check if no scripts are attached.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl Document for InMemoryDocument {
    fn scripts(&self) -> Vec<ScriptElement> {
        self.scripts.values().cloned().collect()
    }

    fn append_script(&mut self, script: NewScript) -> ScriptHandle {
        self.next_handle += 1;
        let handle = ScriptHandle(self.next_handle);
        self.scripts.insert(
            handle,
            ScriptElement {
                handle,
                id: script.id,
                script_type: script.script_type,
                src: script.src,
                is_async: script.is_async,
                defer: script.defer,
            },
        );
        self.pending_insertions += 1;
        handle
    }

    fn remove_script(&mut self, handle: ScriptHandle) -> bool {
        // shift_remove keeps the remaining elements in document order
        self.scripts.shift_remove(&handle).is_some()
    }

    fn take_insertions(&mut self) -> usize {
        std::mem::take(&mut self.pending_insertions)
    }
}
