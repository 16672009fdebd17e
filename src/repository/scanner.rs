//! Directory scanner
//!
//! Walks the configured roots top-down looking for directories that carry a
//! `.git` entry. A repository's subtree is never descended into, and
//! directories with conventionally irrelevant names (build outputs,
//! dependency caches) are pruned before they are walked.

use rustc_hash::FxHashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::backend::VcsBackend;
use super::validator::RepositoryValidator;
use crate::model::{RepoKind, RepositoryHandle, disambiguate_names};
use crate::progress::ProgressReporter;
use crate::search::SessionContext;

/// Name of the metadata entry that marks a repository root
pub const GIT_DIR: &str = ".git";

/// Repositories collected by a scan.
///
/// When `cancelled` is set the walk stopped early and `repositories` holds
/// whatever was found up to that point.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub repositories: Vec<RepositoryHandle>,
    pub cancelled: bool,
}

pub struct DirectoryScanner<B> {
    validator: RepositoryValidator<B>,
    skip_names: FxHashSet<String>,
    progress: Arc<dyn ProgressReporter>,
}

impl<B: VcsBackend> DirectoryScanner<B> {
    pub fn new(
        backend: Arc<B>,
        skip_names: impl IntoIterator<Item = String>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            validator: RepositoryValidator::new(backend),
            skip_names: skip_names.into_iter().collect(),
            progress,
        }
    }

    /// Walk every root and collect the valid repositories under it.
    ///
    /// Counters are recorded in `ctx` as the walk goes. Missing roots are
    /// skipped with a warning. Repositories sharing a directory name are
    /// named by their root path.
    pub fn scan(&self, roots: &[PathBuf], ctx: &SessionContext, cancel: &CancellationToken) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let pb = self.progress.start("Scanning for repositories", 0);

        'roots: for root in roots {
            if !root.is_dir() {
                warn!("Skipping {}: directory does not exist", root.display());
                continue;
            }
            debug!("Scanning {}", root.display());

            let mut walker = WalkDir::new(root).follow_links(false).into_iter();
            while let Some(entry) = walker.next() {
                if cancel.is_cancelled() {
                    outcome.cancelled = true;
                    break 'roots;
                }
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!("Skipping unreadable entry: {}", e);
                        continue;
                    }
                };
                if !entry.file_type().is_dir() {
                    continue;
                }
                if entry.depth() > 0 && self.is_skipped(entry.file_name()) {
                    ctx.update_stats(|s| s.directories_skipped += 1);
                    walker.skip_current_dir();
                    continue;
                }

                ctx.update_stats(|s| s.directories_scanned += 1);
                if !entry.path().join(GIT_DIR).exists() {
                    continue;
                }

                if let Some(repo) = self.visit_repository(entry.path(), ctx) {
                    pb.set_message(format!("Found: {}", repo.name()));
                    outcome.repositories.push(repo);
                }
                walker.skip_current_dir();
            }
        }

        pb.finish();
        disambiguate_names(&mut outcome.repositories);
        debug!(
            "Scan finished: {} repositories{}",
            outcome.repositories.len(),
            if outcome.cancelled { " (cancelled)" } else { "" }
        );
        outcome
    }

    fn visit_repository(&self, path: &Path, ctx: &SessionContext) -> Option<RepositoryHandle> {
        let validation = self.validator.classify(path);
        let kind = validation.handle.kind();
        ctx.update_stats(|s| {
            s.git_dirs_found += 1;
            match kind {
                RepoKind::Valid => {}
                RepoKind::Bare => s.bare_repos += 1,
                RepoKind::Invalid => s.invalid_repos += 1,
            }
        });

        match kind {
            RepoKind::Valid => Some(validation.handle),
            RepoKind::Bare => {
                debug!("Skipping bare repository {}", path.display());
                None
            }
            RepoKind::Invalid => {
                debug!(
                    "Skipping invalid repository {}: {}",
                    path.display(),
                    validation.diagnostic.as_deref().unwrap_or("unknown error")
                );
                None
            }
        }
    }

    fn is_skipped(&self, name: &OsStr) -> bool {
        name.to_str().is_some_and(|n| self.skip_names.contains(n))
    }
}
