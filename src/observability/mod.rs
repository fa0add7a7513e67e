//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! validated [logging] section
//!     → logging.rs (sink, level, format → global tracing subscriber)
//!
//! All subsystems produce:
//!     → tracing events, optionally inside a `component` span
//! ```
//!
//! # Design Decisions
//! - The logger is built only after configuration has loaded; events emitted
//!   earlier (during config resolution) are dropped
//! - One subscriber per process; the guard owns the sink

pub mod logging;

pub use logging::{init_logging, LoggingError, LoggingGuard};
