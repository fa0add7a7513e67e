//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Initialize logging → hand over to the daemon
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → daemon returns, guards flush, process exits
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging
//! - Fail fast: any startup error is fatal and maps to its own exit code

pub mod signals;
pub mod startup;

pub use signals::shutdown_signal;
pub use startup::{check_config, startup, Started, StartupError};
