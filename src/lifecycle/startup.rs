//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging from the validated `[logging]` section
//! - Translate the failing stage into a process exit code

use std::io;
use std::sync::Arc;

use crate::config::{ConfigContext, ConfigDocument, ConfigError, ConfigLoader, ResolvedPath};
use crate::observability::{init_logging, LoggingError, LoggingGuard};

/// Any failure not covered by a more specific code.
pub const EXIT_FAILURE: u8 = 1;

/// Configuration could not be resolved, parsed or validated.
pub const EXIT_CONFIG: u8 = 2;

/// Configuration is fine but the logger could not be initialized.
pub const EXIT_LOGGING: u8 = 3;

/// A failed startup stage.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("{0}")]
    Config(Arc<ConfigError>),

    #[error("initializing logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("rendering config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error(transparent)]
    Runtime(#[from] io::Error),
}

impl From<Arc<ConfigError>> for StartupError {
    fn from(err: Arc<ConfigError>) -> Self {
        StartupError::Config(err)
    }
}

impl StartupError {
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::Config(_) => EXIT_CONFIG,
            StartupError::Logging(_) => EXIT_LOGGING,
            StartupError::Render(_) | StartupError::Runtime(_) => EXIT_FAILURE,
        }
    }
}

/// Everything the daemon needs once startup succeeded.
#[must_use]
pub struct Started<'a> {
    pub config: &'a ConfigDocument,
    pub source: Option<&'a ResolvedPath>,
    pub logging: LoggingGuard,
}

/// Load configuration, then bring up logging.
pub fn startup<L: ConfigLoader>(ctx: &ConfigContext<L>) -> Result<Started<'_>, StartupError> {
    let config = ctx.load()?;
    let logging = init_logging(&config.logging)?;

    Ok(Started {
        config,
        source: ctx.resolved_path(),
        logging,
    })
}

/// Load configuration and describe the effective settings, without starting
/// anything.
pub fn check_config<L: ConfigLoader>(ctx: &ConfigContext<L>) -> Result<String, StartupError> {
    let config = ctx.load()?;
    let rendered = toml::to_string_pretty(config)?;

    let mut report = String::new();
    if let Some(source) = ctx.resolved_path() {
        report.push_str(&format!("# configuration ok: {}\n", source));
    }
    report.push_str(&rendered);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_exit_codes_are_distinct() {
        let config = StartupError::Config(Arc::new(ConfigError::NotFound {
            file_name: "x.toml".into(),
            searched: Vec::new(),
        }));
        let logging = StartupError::Logging(LoggingError::MissingFileName);
        let runtime = StartupError::Runtime(io::Error::new(io::ErrorKind::Other, "boom"));

        assert_eq!(config.exit_code(), EXIT_CONFIG);
        assert_eq!(logging.exit_code(), EXIT_LOGGING);
        assert_eq!(runtime.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_check_config_renders_effective_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[core]\nserver = \"core-1:7000\"\ncontrol = \"core-1:7001\"\n")
            .unwrap();

        let ctx = ConfigContext::from_path(file.path());
        let report = check_config(&ctx).unwrap();

        assert!(report.starts_with("# configuration ok: "));
        assert!(report.contains("explicit path"));
        assert!(report.contains("level = \"INFO\""));
        assert!(report.contains("state_dir = \"/var/lib/state/quorumbd\""));

        let body = report.split_once('\n').unwrap().1;
        let reparsed = crate::config::loader::parse_document(body).unwrap();
        assert_eq!(&reparsed, ctx.get());
    }

    #[test]
    fn test_check_config_reports_config_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ConfigContext::from_path(dir.path().join("missing.toml"));

        let err = check_config(&ctx).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }
}
