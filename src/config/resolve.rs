//! Configuration file discovery.
//!
//! Resolution order, first existing non-directory file wins:
//! 1. The path named by the override environment variable (if any)
//! 2. `<user config dir>/quorumbd/<file>`
//! 3. `<home dir>/.quorumbd/<file>`
//! 4. `/etc/quorumbd/<file>`
//!
//! Tiers are never merged: exactly one file is loaded.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::loader::ConfigError;

/// Directory name used below every search root.
pub const PRODUCT_NAMESPACE: &str = "quorumbd";

/// Which tier a configuration file was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTier {
    /// Literal path from the override environment variable.
    Environment,

    /// Platform user config directory (`~/.config` on Linux).
    UserConfig,

    /// Dot-directory in the user's home.
    UserHome,

    /// System-wide config under `/etc`.
    System,

    /// Passed in directly, no search performed.
    Explicit,
}

impl fmt::Display for SearchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchTier::Environment => write!(f, "environment variable"),
            SearchTier::UserConfig => write!(f, "user config dir"),
            SearchTier::UserHome => write!(f, "user home dir"),
            SearchTier::System => write!(f, "system config"),
            SearchTier::Explicit => write!(f, "explicit path"),
        }
    }
}

/// A config file that existed when it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    tier: SearchTier,
}

impl ResolvedPath {
    /// Wrap a path that was chosen without searching.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tier: SearchTier::Explicit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tier(&self) -> SearchTier {
        self.tier
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.tier)
    }
}

/// Base directories searched by the directory tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoots {
    pub user_config_dir: Option<PathBuf>,
    pub home_dir: Option<PathBuf>,
    pub system_dir: PathBuf,
}

impl SearchRoots {
    /// The real platform directories of the current user.
    pub fn system() -> Self {
        Self {
            user_config_dir: dirs::config_dir(),
            home_dir: dirs::home_dir(),
            system_dir: PathBuf::from("/etc"),
        }
    }

    /// Directory-tier candidates for `file_name`, in precedence order.
    pub fn candidates(&self, file_name: &str) -> Vec<(SearchTier, PathBuf)> {
        let mut candidates = Vec::with_capacity(3);

        if let Some(dir) = &self.user_config_dir {
            candidates.push((
                SearchTier::UserConfig,
                dir.join(PRODUCT_NAMESPACE).join(file_name),
            ));
        }

        if let Some(dir) = &self.home_dir {
            candidates.push((
                SearchTier::UserHome,
                dir.join(format!(".{}", PRODUCT_NAMESPACE)).join(file_name),
            ));
        }

        candidates.push((
            SearchTier::System,
            self.system_dir.join(PRODUCT_NAMESPACE).join(file_name),
        ));

        candidates
    }
}

/// Resolve `file_name` against the platform search roots.
///
/// An empty `env_var` disables the environment tier.
pub fn resolve_config_path(file_name: &str, env_var: &str) -> Result<ResolvedPath, ConfigError> {
    resolve_config_path_in(&SearchRoots::system(), file_name, env_var)
}

/// Resolve `file_name` against the given search roots.
pub fn resolve_config_path_in(
    roots: &SearchRoots,
    file_name: &str,
    env_var: &str,
) -> Result<ResolvedPath, ConfigError> {
    let mut searched = Vec::with_capacity(4);

    if let Some(path) = env_override(env_var) {
        if is_file(&path) {
            return Ok(found(path, SearchTier::Environment));
        }
        tracing::debug!(env_var, path = %path.display(), "config override does not exist, searching");
        searched.push(path);
    }

    for (tier, path) in roots.candidates(file_name) {
        if is_file(&path) {
            return Ok(found(path, tier));
        }
        searched.push(path);
    }

    Err(ConfigError::NotFound {
        file_name: file_name.to_string(),
        searched,
    })
}

fn env_override(env_var: &str) -> Option<PathBuf> {
    if env_var.is_empty() {
        return None;
    }
    std::env::var_os(env_var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn found(path: PathBuf, tier: SearchTier) -> ResolvedPath {
    tracing::debug!(path = %path.display(), %tier, "config file resolved");
    ResolvedPath { path, tier }
}

fn is_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| !meta.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FILE: &str = "test.toml";

    struct Roots {
        _tmp: TempDir,
        roots: SearchRoots,
    }

    fn roots() -> Roots {
        let tmp = tempfile::tempdir().unwrap();
        let roots = SearchRoots {
            user_config_dir: Some(tmp.path().join("config")),
            home_dir: Some(tmp.path().join("home")),
            system_dir: tmp.path().join("etc"),
        };
        Roots { _tmp: tmp, roots }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_candidate_order() {
        let r = roots();
        let tiers: Vec<_> = r.roots.candidates(FILE).into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            tiers,
            vec![SearchTier::UserConfig, SearchTier::UserHome, SearchTier::System]
        );

        let paths: Vec<_> = r.roots.candidates(FILE).into_iter().map(|(_, p)| p).collect();
        assert!(paths[0].ends_with("config/quorumbd/test.toml"));
        assert!(paths[1].ends_with("home/.quorumbd/test.toml"));
        assert!(paths[2].ends_with("etc/quorumbd/test.toml"));
    }

    #[test]
    fn test_missing_roots_are_skipped() {
        let roots = SearchRoots {
            user_config_dir: None,
            home_dir: None,
            system_dir: PathBuf::from("/etc"),
        };
        assert_eq!(
            roots.candidates(FILE),
            vec![(SearchTier::System, PathBuf::from("/etc/quorumbd/test.toml"))]
        );
    }

    #[test]
    fn test_not_found_lists_searched_paths() {
        let r = roots();
        let err = resolve_config_path_in(&r.roots, FILE, "").unwrap_err();
        match err {
            ConfigError::NotFound { file_name, searched } => {
                assert_eq!(file_name, FILE);
                assert_eq!(searched.len(), 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_lowest_tier_is_found() {
        let r = roots();
        let system = r.roots.system_dir.join("quorumbd").join(FILE);
        touch(&system);

        let resolved = resolve_config_path_in(&r.roots, FILE, "").unwrap();
        assert_eq!(resolved.path(), system);
        assert_eq!(resolved.tier(), SearchTier::System);
    }

    #[test]
    fn test_higher_tier_wins() {
        let r = roots();
        for (_, path) in r.roots.candidates(FILE) {
            touch(&path);
        }

        let resolved = resolve_config_path_in(&r.roots, FILE, "").unwrap();
        assert_eq!(resolved.tier(), SearchTier::UserConfig);

        fs::remove_file(resolved.path()).unwrap();
        let resolved = resolve_config_path_in(&r.roots, FILE, "").unwrap();
        assert_eq!(resolved.tier(), SearchTier::UserHome);
    }

    #[test]
    fn test_directory_is_not_a_candidate() {
        let r = roots();
        let user = r.roots.user_config_dir.clone().unwrap().join("quorumbd").join(FILE);
        fs::create_dir_all(&user).unwrap();
        let system = r.roots.system_dir.join("quorumbd").join(FILE);
        touch(&system);

        let resolved = resolve_config_path_in(&r.roots, FILE, "").unwrap();
        assert_eq!(resolved.tier(), SearchTier::System);
    }

    #[test]
    fn test_env_override_wins_over_system() {
        let r = roots();
        let system = r.roots.system_dir.join("quorumbd").join(FILE);
        touch(&system);
        let custom = r.roots.system_dir.join("custom.toml");
        touch(&custom);

        let var = "QUORUMBD_RESOLVE_TEST_ENV_WINS";
        std::env::set_var(var, &custom);
        let resolved = resolve_config_path_in(&r.roots, FILE, var);
        std::env::remove_var(var);

        let resolved = resolved.unwrap();
        assert_eq!(resolved.path(), custom);
        assert_eq!(resolved.tier(), SearchTier::Environment);
    }

    #[test]
    fn test_env_override_to_missing_file_falls_through() {
        let r = roots();
        let system = r.roots.system_dir.join("quorumbd").join(FILE);
        touch(&system);

        let var = "QUORUMBD_RESOLVE_TEST_ENV_MISSING";
        std::env::set_var(var, r.roots.system_dir.join("nope.toml"));
        let resolved = resolve_config_path_in(&r.roots, FILE, var);
        std::env::remove_var(var);

        assert_eq!(resolved.unwrap().tier(), SearchTier::System);
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let r = roots();
        let var = "QUORUMBD_RESOLVE_TEST_ENV_EMPTY";
        std::env::set_var(var, "");
        let err = resolve_config_path_in(&r.roots, FILE, var).unwrap_err();
        std::env::remove_var(var);

        match err {
            ConfigError::NotFound { searched, .. } => assert_eq!(searched.len(), 3),
            other => panic!("unexpected error: {}", other),
        }
    }
}
