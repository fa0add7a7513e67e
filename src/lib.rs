//! quorumbd middleware startup library: configuration, logging and lifecycle.

pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::{ConfigContext, ConfigDocument, ConfigError};
pub use lifecycle::StartupError;
