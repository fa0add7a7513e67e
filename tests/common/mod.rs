//! Shared utilities for configuration integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use quorumbd_middleware::config::{FileConfigLoader, SearchRoots, SearchTier};
use tempfile::TempDir;

pub const FILE_NAME: &str = "middleware-qemu-nbd.toml";

/// Minimal valid configuration: only the core endpoints have no default.
pub const MINIMAL: &str = r#"
[core]
server = "core-1:7000"
control = "core-1:7001"
"#;

/// A scratch directory laid out like the search roots of a real host.
pub struct ConfigTree {
    pub tmp: TempDir,
    pub roots: SearchRoots,
}

impl ConfigTree {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let roots = SearchRoots {
            user_config_dir: Some(tmp.path().join("xdg")),
            home_dir: Some(tmp.path().join("home")),
            system_dir: tmp.path().join("etc"),
        };
        Self { tmp, roots }
    }

    /// Where a config file for `tier` lives in this tree.
    pub fn path_for(&self, tier: SearchTier) -> PathBuf {
        self.roots
            .candidates(FILE_NAME)
            .into_iter()
            .find(|(t, _)| *t == tier)
            .map(|(_, path)| path)
            .unwrap_or_else(|| self.tmp.path().join("override").join(FILE_NAME))
    }

    /// Write `contents` to the file of `tier`, creating directories.
    pub fn write(&self, tier: SearchTier, contents: &str) -> PathBuf {
        let path = self.path_for(tier);
        write_file(&path, contents);
        path
    }

    /// Loader searching this tree, with `env_var` as the override variable.
    #[allow(dead_code)]
    pub fn loader(&self, env_var: &str) -> FileConfigLoader {
        FileConfigLoader::with_roots(self.roots.clone(), FILE_NAME, env_var)
    }
}

pub fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}
