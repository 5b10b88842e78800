//! Load requests.

use crate::LibrarySet;

/// Parameters of a single load attempt.
///
/// Built fresh for every accepted `load_script` call and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// API key identifying the caller to the external resource.
    pub resource_key: String,
    /// UI language, e.g. `id` or `en`.
    pub locale: String,
    /// Region bias, e.g. `ID` or `US`.
    pub region: String,
    /// Optional libraries to load with the core script.
    pub libraries: LibrarySet,
}

impl LoadRequest {
    /// Create a new load request.
    pub fn new(
        resource_key: impl Into<String>,
        locale: impl Into<String>,
        region: impl Into<String>,
        libraries: LibrarySet,
    ) -> Self {
        Self {
            resource_key: resource_key.into(),
            locale: locale.into(),
            region: region.into(),
            libraries,
        }
    }
}
