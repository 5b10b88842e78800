//! Error types for the load coordinator.

use maploader_types::LoadCycle;
use thiserror::Error;

/// Reasons a load call is refused.
///
/// A refused call changes nothing: no document mutation, no flag reset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Another load has not settled yet.
    #[error("Load already in flight ({cycle})")]
    InFlight { cycle: LoadCycle },
}
