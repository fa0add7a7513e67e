//! Configuration schema definitions.
//!
//! This module defines the configuration document of the qemu-nbd middleware.
//! All types derive Serde traits for (de)serialization from TOML. Every
//! table rejects unknown keys, so a typo in the file fails the load instead of
//! being silently ignored.
//!
//! Fields that carry a default are `Option`s: `None` means "absent from the
//! file" and is the only state the defaulting pass touches. An explicitly
//! written empty value stays empty and is reported by validation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigDocument {
    /// Settings shared by every quorumbd daemon.
    pub common: CommonConfig,

    /// NBD server socket the middleware listens on.
    pub nbdserver: NbdServerConfig,

    /// Connection to the quorumbd core.
    pub core: CoreConnectionConfig,

    /// Log sink, level and format.
    pub logging: LoggingConfig,
}

/// `[common]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommonConfig {
    /// Directory for persistent daemon state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

/// `[nbdserver]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NbdServerConfig {
    /// Unix socket path qemu connects to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket: Option<PathBuf>,
}

/// `[core]` section.
///
/// Empty strings and empty lists are treated the same as absent keys here;
/// none of these fields has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConnectionConfig {
    /// Primary core data endpoint.
    pub server: String,

    /// Fallback data endpoints, tried in order.
    pub server_fallback: Vec<String>,

    /// Primary core control endpoint.
    pub control: String,

    /// Control endpoints paired 1:1 with `server_fallback`.
    pub control_fallback: Vec<String>,
}

/// `[logging]` section.
///
/// The string fields are kept verbatim so validation can report bad values
/// per field; [`LogSink`], [`LogLevel`] and [`LogFormat`] are the typed views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink type: `stdout` (alias `console`) or `file`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Log file, only meaningful for the `file` sink. Empty equals absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,

    /// Minimum severity: debug, info, warn or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Output format: `text` or `json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LoggingConfig {
    /// Parsed sink type, `None` if unset or not a known value.
    pub fn sink_kind(&self) -> Option<LogSinkKind> {
        self.kind.as_deref().and_then(|v| v.parse().ok())
    }

    /// The log file name, with an empty path read as absent.
    pub fn file_name(&self) -> Option<&std::path::Path> {
        self.filename
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Error returned when a logging setting is not one of its allowed values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {setting} {value:?}")]
pub struct UnknownSetting {
    pub setting: &'static str,
    pub value: String,
}

impl UnknownSetting {
    fn new(setting: &'static str, value: &str) -> Self {
        Self {
            setting,
            value: value.to_string(),
        }
    }
}

/// Kind of log sink selected by `logging.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSinkKind {
    Stdout,
    File,
}

impl LogSinkKind {
    pub const ALLOWED: &'static [&'static str] = &["stdout", "console", "file"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogSinkKind::Stdout => "stdout",
            LogSinkKind::File => "file",
        }
    }
}

impl FromStr for LogSinkKind {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" | "console" => Ok(LogSinkKind::Stdout),
            "file" => Ok(LogSinkKind::File),
            other => Err(UnknownSetting::new("logging.type", other)),
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stdout,
    File(PathBuf),
}

/// Minimum severity that is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALLOWED: &'static [&'static str] = &["DEBUG", "INFO", "WARN", "ERROR"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl FromStr for LogLevel {
    type Err = UnknownSetting;

    /// Case-insensitive, so `info`, `Info` and `INFO` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(UnknownSetting::new("logging.level", s)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line format of emitted log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub const ALLOWED: &'static [&'static str] = &["text", "json"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(UnknownSetting::new("logging.format", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_kind_accepts_console_alias() {
        assert_eq!("stdout".parse::<LogSinkKind>(), Ok(LogSinkKind::Stdout));
        assert_eq!("console".parse::<LogSinkKind>(), Ok(LogSinkKind::Stdout));
        assert_eq!("file".parse::<LogSinkKind>(), Ok(LogSinkKind::File));
        assert!("syslog".parse::<LogSinkKind>().is_err());
    }

    #[test]
    fn test_level_is_case_insensitive() {
        assert_eq!("info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        let err = "trace".parse::<LogLevel>().unwrap_err();
        assert_eq!(err.to_string(), "unknown logging.level \"trace\"");
    }

    #[test]
    fn test_format_is_exact() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("JSON".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_empty_filename_reads_as_absent() {
        let logging = LoggingConfig {
            filename: Some(PathBuf::new()),
            ..LoggingConfig::default()
        };
        assert!(logging.file_name().is_none());
    }
}
