//! Cascading defaults.
//!
//! Runs after parsing and before validation. Each section fills only the
//! fields that were absent from the file (`None`); explicit values, including
//! explicit empty strings, are left alone. Applying the defaults a second
//! time changes nothing.

use std::path::PathBuf;

use crate::config::schema::{
    CommonConfig, ConfigDocument, CoreConnectionConfig, LogFormat, LogLevel, LogSinkKind,
    LoggingConfig, NbdServerConfig,
};

/// Default directory for persistent daemon state.
pub const DEFAULT_STATE_DIR: &str = "/var/lib/state/quorumbd";

/// Default path of the NBD server socket.
pub const DEFAULT_NBD_SOCKET: &str = "/run/quorumbd/middleware-qemu-nbd.sock";

pub const DEFAULT_LOG_SINK: LogSinkKind = LogSinkKind::Stdout;
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;
pub const DEFAULT_LOG_FORMAT: LogFormat = LogFormat::Text;

impl ConfigDocument {
    /// Apply every section's defaults in place.
    pub fn apply_defaults(&mut self) {
        self.common.apply_defaults();
        self.nbdserver.apply_defaults();
        self.core.apply_defaults();
        self.logging.apply_defaults();
    }
}

impl CommonConfig {
    pub fn apply_defaults(&mut self) {
        fill(&mut self.state_dir, "common.state_dir", || {
            PathBuf::from(DEFAULT_STATE_DIR)
        });
    }
}

impl NbdServerConfig {
    pub fn apply_defaults(&mut self) {
        fill(&mut self.socket, "nbdserver.socket", || {
            PathBuf::from(DEFAULT_NBD_SOCKET)
        });
    }
}

impl CoreConnectionConfig {
    /// The core endpoints have no sensible defaults; they must be configured.
    pub fn apply_defaults(&mut self) {}
}

impl LoggingConfig {
    pub fn apply_defaults(&mut self) {
        fill(&mut self.kind, "logging.type", || {
            DEFAULT_LOG_SINK.as_str().to_string()
        });
        fill(&mut self.level, "logging.level", || {
            DEFAULT_LOG_LEVEL.as_str().to_string()
        });
        fill(&mut self.format, "logging.format", || {
            DEFAULT_LOG_FORMAT.as_str().to_string()
        });
    }
}

fn fill<T: std::fmt::Debug>(slot: &mut Option<T>, field: &str, default: impl FnOnce() -> T) {
    if slot.is_none() {
        let value = default();
        tracing::debug!(field, ?value, "applying config default");
        *slot = Some(value);
    }
}
