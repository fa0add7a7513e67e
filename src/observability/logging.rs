//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber from the `[logging]` section
//! - Route output to stdout or an append-only log file
//! - Emit plain text or JSON lines
//!
//! # Design Decisions
//! - Output goes through a `tracing_appender` non-blocking writer; the
//!   returned [`LoggingGuard`] flushes and closes the sink when dropped
//! - The configured level is a hard floor; `RUST_LOG` can only narrow it
//!   further per target, never let lower-severity records through
//! - Initializing twice is an error, not a panic

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::schema::{
    LogFormat, LogLevel, LogSink, LogSinkKind, LoggingConfig, UnknownSetting,
};

/// Errors raised while building the logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid logging settings: {0}")]
    Setting(#[from] UnknownSetting),

    #[error("logging.{0} is not set")]
    Unset(&'static str),

    #[error("logging.filename required when logging.type=file")]
    MissingFileName,

    #[error("cannot open logging file {}: {source}", .path.display())]
    OpenFile { path: PathBuf, source: io::Error },

    #[error("logger already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Typed logger settings derived from a validated [`LoggingConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerSettings {
    pub sink: LogSink,
    pub level: LogLevel,
    pub format: LogFormat,
}

impl LoggerSettings {
    pub fn from_config(config: &LoggingConfig) -> Result<Self, LoggingError> {
        let kind: LogSinkKind = required(config.kind.as_deref(), "type")?.parse()?;
        let sink = match kind {
            LogSinkKind::Stdout => LogSink::Stdout,
            LogSinkKind::File => LogSink::File(
                config
                    .file_name()
                    .ok_or(LoggingError::MissingFileName)?
                    .to_path_buf(),
            ),
        };

        Ok(Self {
            sink,
            level: required(config.level.as_deref(), "level")?.parse()?,
            format: required(config.format.as_deref(), "format")?.parse()?,
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, LoggingError> {
    value.ok_or(LoggingError::Unset(field))
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Keeps the log writer alive. Dropping it flushes pending lines and closes
/// the log file.
#[derive(Debug)]
#[must_use = "dropping the guard stops log output"]
pub struct LoggingGuard {
    _worker: WorkerGuard,
}

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let settings = LoggerSettings::from_config(config)?;

    let (writer, worker) = match &settings.sink {
        LogSink::Stdout => tracing_appender::non_blocking(io::stdout()),
        LogSink::File(path) => tracing_appender::non_blocking(open_log_file(path)?),
    };
    let ansi = settings.sink == LogSink::Stdout && io::stdout().is_terminal();

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (floor, refine) = level_filters(settings.level, env.as_deref());

    match settings.format {
        LogFormat::Text => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true);
            tracing_subscriber::registry()
                .with(floor)
                .with(refine)
                .with(layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_current_span(true)
                .with_target(true);
            tracing_subscriber::registry()
                .with(floor)
                .with(refine)
                .with(layer)
                .try_init()?;
        }
    }

    tracing::info!(
        sink = ?settings.sink,
        level = %settings.level,
        format = %settings.format,
        "logger initialized"
    );

    Ok(LoggingGuard { _worker: worker })
}

/// Filters for the configured `level` plus optional `RUST_LOG`-style
/// `directives`.
///
/// Both filters must pass a record. The level filter drops everything below
/// the configured level; the directives only narrow what remains.
pub fn level_filters(level: LogLevel, directives: Option<&str>) -> (LevelFilter, EnvFilter) {
    let floor = LevelFilter::from_level(level.into());
    let refine = EnvFilter::builder()
        .with_default_directive(LevelFilter::TRACE.into())
        .parse_lossy(directives.unwrap_or_default());
    (floor, refine)
}

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    options.open(path).map_err(|source| LoggingError::OpenFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Span tagging everything inside it with the emitting component.
pub fn component(name: &'static str) -> tracing::Span {
    tracing::info_span!("component", pkg = name)
}
