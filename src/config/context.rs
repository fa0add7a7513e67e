//! Load-once holder for the process configuration.
//!
//! A [`ConfigContext`] is created by the entry point and handed (by
//! reference or `Arc`) to whatever needs configuration. The first call to
//! [`ConfigContext::load`] runs the whole pipeline; every later or concurrent
//! call gets the same outcome without touching the filesystem again.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::config::loader::{load_config, ConfigError};
use crate::config::resolve::{resolve_config_path_in, ResolvedPath, SearchRoots};
use crate::config::schema::ConfigDocument;

/// A validated document together with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub source: ResolvedPath,
    pub document: ConfigDocument,
}

/// Produces a validated configuration. Run at most once per context.
pub trait ConfigLoader: Send + Sync {
    fn load(&self) -> Result<LoadedConfig, ConfigError>;
}

#[derive(Debug, Clone)]
enum Locator {
    Search {
        roots: SearchRoots,
        file_name: String,
        env_var: String,
    },
    Explicit(PathBuf),
}

/// Resolves the config file, then reads, defaults and validates it.
#[derive(Debug, Clone)]
pub struct FileConfigLoader {
    locator: Locator,
}

impl FileConfigLoader {
    /// Search the platform locations for `file_name`, with `env_var` as the
    /// override (empty for none).
    pub fn new(file_name: impl Into<String>, env_var: impl Into<String>) -> Self {
        Self::with_roots(SearchRoots::system(), file_name, env_var)
    }

    /// Like [`FileConfigLoader::new`] but searching below custom roots.
    pub fn with_roots(
        roots: SearchRoots,
        file_name: impl Into<String>,
        env_var: impl Into<String>,
    ) -> Self {
        Self {
            locator: Locator::Search {
                roots,
                file_name: file_name.into(),
                env_var: env_var.into(),
            },
        }
    }

    /// Load exactly this file.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            locator: Locator::Explicit(path.into()),
        }
    }

    fn resolve(&self) -> Result<ResolvedPath, ConfigError> {
        match &self.locator {
            Locator::Search {
                roots,
                file_name,
                env_var,
            } => resolve_config_path_in(roots, file_name, env_var),
            Locator::Explicit(path) => Ok(ResolvedPath::explicit(path.clone())),
        }
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let source = self.resolve()?;
        let document = load_config(source.path())?;
        Ok(LoadedConfig { source, document })
    }
}

/// Holds the outcome of the one configuration load of this process.
pub struct ConfigContext<L = FileConfigLoader> {
    loader: L,
    loaded: OnceLock<Result<LoadedConfig, Arc<ConfigError>>>,
}

impl ConfigContext<FileConfigLoader> {
    /// Context that searches the platform locations for `file_name`.
    pub fn new(file_name: impl Into<String>, env_var: impl Into<String>) -> Self {
        Self::with_loader(FileConfigLoader::new(file_name, env_var))
    }

    /// Context that loads a single explicit file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_loader(FileConfigLoader::explicit(path))
    }
}

impl<L: ConfigLoader> ConfigContext<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            loaded: OnceLock::new(),
        }
    }

    /// Run the load pipeline once and return its outcome.
    ///
    /// Concurrent first callers block until the single load finishes. A
    /// failure is recorded too: later calls return the same error instead of
    /// retrying.
    pub fn load(&self) -> Result<&ConfigDocument, Arc<ConfigError>> {
        let outcome = self.loaded.get_or_init(|| {
            let outcome = self.loader.load().map_err(Arc::new);
            match &outcome {
                Ok(loaded) => tracing::info!(source = %loaded.source, "configuration loaded"),
                Err(err) => tracing::error!(error = %err, "configuration load failed"),
            }
            outcome
        });

        match outcome {
            Ok(loaded) => Ok(&loaded.document),
            Err(err) => Err(Arc::clone(err)),
        }
    }

    /// The loaded document.
    ///
    /// # Panics
    /// If called before a successful [`ConfigContext::load`]. Components rely
    /// on configuration being present before they start, so this is a bug in
    /// the caller.
    pub fn get(&self) -> &ConfigDocument {
        match self.try_get() {
            Some(document) => document,
            None => panic!("ConfigContext::get() called before a successful load()"),
        }
    }

    /// The loaded document, or `None` if loading has not succeeded.
    pub fn try_get(&self) -> Option<&ConfigDocument> {
        self.loaded_config().map(|loaded| &loaded.document)
    }

    /// Where the loaded document came from.
    pub fn resolved_path(&self) -> Option<&ResolvedPath> {
        self.loaded_config().map(|loaded| &loaded.source)
    }

    /// Whether a load has been attempted, successful or not.
    pub fn is_initialized(&self) -> bool {
        self.loaded.get().is_some()
    }

    fn loaded_config(&self) -> Option<&LoadedConfig> {
        match self.loaded.get() {
            Some(Ok(loaded)) => Some(loaded),
            _ => None,
        }
    }
}
