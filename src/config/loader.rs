//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::aggregate::SectionFailure;
use crate::config::schema::ConfigDocument;
use crate::config::validation::ValidationErrors;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No candidate location held the config file.
    #[error("no config file found for {file_name} (searched: {})", join_paths(.searched))]
    NotFound {
        file_name: String,
        searched: Vec<PathBuf>,
    },

    #[error("reading config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed TOML, unknown key or type mismatch.
    #[error("parsing config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// One or more field violations, across all sections.
    #[error("invalid config {}: {errors}", .path.display())]
    Validation {
        path: PathBuf,
        errors: ValidationErrors,
    },

    /// A section validator failed for a reason other than a field violation.
    #[error("invalid config {}: {source}", .path.display())]
    Section {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl ConfigError {
    /// The file the error refers to, if one was resolved.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::NotFound { .. } => None,
            ConfigError::Io { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Validation { path, .. }
            | ConfigError::Section { path, .. } => Some(path),
        }
    }

    /// The field violations, for validation failures.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ConfigError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decode a TOML document. Unknown keys and type mismatches are errors.
pub fn parse_document(content: &str) -> Result<ConfigDocument, toml::de::Error> {
    toml::from_str(content)
}

/// Read and decode the file at `path`, without defaults or validation.
pub fn read_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_document(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load, default and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let mut config = read_document(path)?;
    config.apply_defaults();

    config.validate().map_err(|failure| match failure {
        SectionFailure::Fields(errors) => ConfigError::Validation {
            path: path.to_path_buf(),
            errors,
        },
        SectionFailure::Other(source) => ConfigError::Section {
            path: path.to_path_buf(),
            source,
        },
    })?;

    tracing::debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}
