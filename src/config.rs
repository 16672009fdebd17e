//! Configuration for commitfinder
//!
//! Sources, highest priority first: CLI flags, environment variables,
//! `config.toml`, built-in defaults. The file lives at
//! `<config_dir>/commitfinder/config.toml` unless `--config` names another.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, InputError};
use crate::search::{ExpanderConfig, QueryConfig};
use crate::util::expand_tilde;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Roots searched when no directory is given on the command line
    pub roots: Vec<String>,
    /// Directory names never descended into
    pub skip_dirs: Vec<String>,
    /// Branch names probed when a repository lists no refs
    pub default_branches: Vec<String>,
    pub max_commits: usize,
    pub max_commits_per_branch: usize,
    pub timeout_secs: u64,
    /// Size above which a repository's metadata triggers a warning; 0 disables it
    pub size_warning_mb: u64,
    /// Repositories queried concurrently; 1 searches them one at a time
    pub jobs: usize,
    pub max_offset: Option<u32>,
    pub keep_expanding: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            roots: vec!["~/code".to_string(), "~/projects".to_string()],
            skip_dirs: [
                "node_modules",
                "target",
                "build",
                "dist",
                "out",
                "vendor",
                "venv",
                ".venv",
                "env",
                "__pycache__",
                ".tox",
                ".mypy_cache",
                ".pytest_cache",
                ".gradle",
                ".cache",
                "tmp",
                "temp",
                "Pods",
                "DerivedData",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            default_branches: vec!["main".to_string(), "master".to_string()],
            max_commits: 100,
            max_commits_per_branch: 50,
            timeout_secs: 30,
            size_warning_mb: 500,
            jobs: 1,
            max_offset: None,
            keep_expanding: false,
        }
    }
}

impl SearchConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("commitfinder").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields the defaults; a file named explicitly
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Configured roots with `~` expanded
    pub fn root_paths(&self) -> Result<Vec<PathBuf>, InputError> {
        self.roots.iter().map(|r| expand_tilde(r)).collect()
    }

    pub fn query_config(&self) -> QueryConfig {
        QueryConfig {
            max_commits: self.max_commits.max(1),
            max_commits_per_branch: self.max_commits_per_branch.max(1),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            size_warning_bytes: (self.size_warning_mb > 0).then(|| self.size_warning_mb * 1024 * 1024),
            default_branches: self.default_branches.clone(),
        }
    }

    pub fn expander_config(&self) -> ExpanderConfig {
        ExpanderConfig {
            max_offset: self.max_offset,
            keep_expanding: self.keep_expanding,
        }
    }
}
