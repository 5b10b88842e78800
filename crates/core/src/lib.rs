//! Core types for the maps script loader.
//!
//! The loader is a synchronous state machine driven by a runner:
//!
//! ```text
//! host callbacks / timers / observer batches
//!                 │
//!                 ▼  Event
//!        ┌──────────────────┐
//!        │  StateMachine    │  mutates host capabilities in place,
//!        │  handle(event)   │  never sleeps or awaits
//!        └────────┬─────────┘
//!                 │  Vec<Action>
//!                 ▼
//!   runner: schedule timers, attach observers, notify the UI binding
//! ```

mod action;
mod event;
mod traits;

pub use action::Action;
pub use event::{Event, TimerId};
pub use traits::StateMachine;
