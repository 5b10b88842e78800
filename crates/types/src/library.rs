//! Optional API libraries requested alongside the core maps script.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A capability flag requested via the `libraries` query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Library {
    Drawing,
    Geometry,
    LocalContext,
    Places,
    Visualization,
}

impl Library {
    /// All known libraries.
    pub const ALL: [Library; 5] = [
        Library::Drawing,
        Library::Geometry,
        Library::LocalContext,
        Library::Places,
        Library::Visualization,
    ];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Library::Drawing => "drawing",
            Library::Geometry => "geometry",
            Library::LocalContext => "localContext",
            Library::Places => "places",
            Library::Visualization => "visualization",
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a library name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown library: {0}")]
pub struct ParseLibraryError(pub String);

impl FromStr for Library {
    type Err = ParseLibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Library::ALL
            .into_iter()
            .find(|lib| lib.as_str() == s)
            .ok_or_else(|| ParseLibraryError(s.to_string()))
    }
}

/// A set of distinct libraries.
///
/// Duplicates collapse on insertion and the wire form is independent of the
/// order in which the caller supplied the libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibrarySet(BTreeSet<Library>);

impl LibrarySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library. Returns false if it was already present.
    pub fn insert(&mut self, library: Library) -> bool {
        self.0.insert(library)
    }

    /// Check membership.
    pub fn contains(&self, library: Library) -> bool {
        self.0.contains(&library)
    }

    /// Number of distinct libraries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no library is requested.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the libraries.
    pub fn iter(&self) -> impl Iterator<Item = Library> + '_ {
        self.0.iter().copied()
    }

    /// Serialize as the sorted, comma-joined list of wire names.
    ///
    /// Sorting is by wire name rather than by enum order so the output never
    /// depends on how the variants happen to be declared.
    pub fn to_query_value(&self) -> String {
        let mut names: Vec<&'static str> = self.0.iter().map(Library::as_str).collect();
        names.sort_unstable();
        names.join(",")
    }
}

impl FromIterator<Library> for LibrarySet {
    fn from_iter<I: IntoIterator<Item = Library>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Library; N]> for LibrarySet {
    fn from(libraries: [Library; N]) -> Self {
        libraries.into_iter().collect()
    }
}

impl FromStr for LibrarySet {
    type Err = ParseLibraryError;

    /// Parse a comma-separated list. Empty segments are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Library::from_str)
            .collect()
    }
}
