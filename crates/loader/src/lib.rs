//! Load coordinator for the maps JavaScript API.
//!
//! This crate provides the [`LoadCoordinator`], which guarantees that at most
//! one load of the external script is in flight and exposes whether the
//! script is ready and whether its bootstrap reloaded itself.
//!
//! # Load sequence
//!
//! ```text
//! load_script(locale, region)
//!     │
//!     ├─ in flight? ──────────────▶ Err(InFlight), nothing touched
//!     │
//!     ├─ 1. phase = Loading, flags reset
//!     ├─ 2. remove matching scripts; if any → arm warning suppression
//!     ├─ 3. delete namespace.property from host globals
//!     ├─ 4. build URL (libraries sorted), append <script>
//!     └─ 5. arm completion watcher
//!
//! ScriptLoaded / GlobalCallbackInvoked ──▶ is_ready = true
//! watcher verdict ──▶ reload_detected, Settle timer ──▶ phase = Idle
//! ```
//!
//! # Components
//!
//! - [`LoadCoordinator`] - The state machine
//! - [`LoaderConfig`] - Endpoint, libraries, callback and watcher settings
//! - [`script_url`] - Request URL construction

mod config;
mod coordinator;
mod error;
mod request_url;

pub use config::{
    CallbackMode, ConfigError, LoaderConfig, DEFAULT_ENDPOINT, DEFAULT_GLOBAL_CALLBACK,
    DEFAULT_SCRIPT_PREFIX,
};
pub use coordinator::LoadCoordinator;
pub use error::LoadError;
pub use request_url::script_url;
