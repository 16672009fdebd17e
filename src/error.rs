//! Error types shared across the crate
//!
//! Per-repository failures never surface as errors to the caller; they are
//! converted into outcome values (`RepoKind`, `QueryOutcome`). The types here
//! cover backend calls, user input and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a version-control backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("failed to open repository: {0}")]
    Open(String),

    #[error("reference not found: {0}")]
    RefNotFound(String),

    #[error("history walk failed: {0}")]
    Walk(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("query deadline exceeded")]
    DeadlineExceeded,
}

/// Invalid command-line input, detected before any search starts
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("an author is required (use --author or set COMMITFINDER_AUTHOR)")]
    MissingAuthor,

    #[error("could not determine home directory to expand '{0}'")]
    NoHomeDir(String),

    #[error("--yes needs --max-offset so the search cannot widen forever")]
    UnboundedAutoAccept,
}

/// Errors loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
