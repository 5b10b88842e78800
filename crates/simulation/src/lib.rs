//! Deterministic simulation runner.
//!
//! This crate drives a [`LoadCoordinator`](maploader_loader::LoadCoordinator)
//! through simulated time so the whole load cycle, including the external
//! resource's own behaviour, can be exercised without a browser or real
//! timers. Given the same seed, it produces identical results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Event Queue (BTreeMap<EventKey, Scheduled>)    │ │
//! │  │     Ordered by: time, sequence                     │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │              ┌────────────┴────────────┐                │
//! │              ▼                         ▼                │
//! │  ┌──────────────────────┐  ┌──────────────────────────┐ │
//! │  │ LoadCoordinator      │  │ ExternalResource         │ │
//! │  │ handle(event)        │  │ bootstrap: follow-on     │ │
//! │  │                      │  │ scripts, warnings,       │ │
//! │  │                      │  │ completion callback      │ │
//! │  └──────────┬───────────┘  └──────────────────────────┘ │
//! │             ▼                                           │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Actions → timers, observer, notifications      │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod event_queue;
mod resource;
mod runner;

#[cfg(test)]
mod tests;

pub use event_queue::EventKey;
pub use resource::ExternalResource;
pub use runner::{SimulationRunner, SimulationStats};
