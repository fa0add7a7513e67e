//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! env override / user config / ~/.quorumbd / /etc
//!     → resolve.rs (first existing file wins)
//!     → loader.rs (read & deserialize, unknown keys rejected)
//!     → defaults.rs (fill absent fields per section)
//!     → validation.rs (per-section field rules)
//!     → aggregate.rs (merge section errors into one report)
//!     → context.rs (load once, shared read-only)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - Defaults are applied before validation, and only to absent fields
//! - Validation separates syntactic (serde) from semantic checks and reports
//!   every violation of every section at once

pub mod aggregate;
pub mod context;
pub mod defaults;
pub mod loader;
pub mod resolve;
pub mod schema;
pub mod validation;

pub use aggregate::{merge_section_results, SectionFailure, SectionResult};
pub use context::{ConfigContext, ConfigLoader, FileConfigLoader, LoadedConfig};
pub use loader::{load_config, ConfigError};
pub use resolve::{resolve_config_path, ResolvedPath, SearchRoots, SearchTier};
pub use schema::{
    CommonConfig, ConfigDocument, CoreConnectionConfig, LogFormat, LogLevel, LogSink,
    LogSinkKind, LoggingConfig, NbdServerConfig,
};
pub use validation::{SectionErrors, ValidationErrors};
