//! Per-repository commit query
//!
//! One query covers one repository and one day. Branches are resolved first
//! (falling back to probing the usual default branch names), then a single
//! walk over all refs is attempted. If the backend cannot do that, each branch
//! is walked on its own with a smaller cap. The whole thing runs on the
//! blocking pool under a hard deadline.

use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::BackendError;
use crate::model::{Commit, RepositoryHandle, SearchWindow};
use crate::repository::{CommitFilter, RefSelector, VcsBackend};
use crate::util::format_size;

/// Limits applied to every repository query
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Cap for the combined all-refs walk
    pub max_commits: usize,
    /// Cap for each branch when falling back to per-branch walks
    pub max_commits_per_branch: usize,
    pub timeout: Duration,
    /// Warn when the metadata directory is larger than this; `None` skips the check
    pub size_warning_bytes: Option<u64>,
    /// Names probed when a repository lists no refs
    pub default_branches: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_commits: 100,
            max_commits_per_branch: 50,
            timeout: Duration::from_secs(30),
            size_warning_bytes: Some(500 * 1024 * 1024),
            default_branches: vec!["main".to_string(), "master".to_string()],
        }
    }
}

/// Result of querying one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Found { repo: String, commits: Vec<Commit> },
    Empty,
    TimedOut,
}

pub struct CommitQuery<B> {
    backend: Arc<B>,
    config: Arc<QueryConfig>,
    /// Repositories whose metadata size was already checked; shared by clones
    size_checked: Arc<Mutex<FxHashSet<PathBuf>>>,
}

impl<B> Clone for CommitQuery<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: Arc::clone(&self.config),
            size_checked: Arc::clone(&self.size_checked),
        }
    }
}

impl<B: VcsBackend> CommitQuery<B> {
    pub fn new(backend: Arc<B>, config: QueryConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            size_checked: Arc::default(),
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Query `repo` for commits by `author` inside `window`.
    ///
    /// The backend work runs on the blocking pool. If it has not finished
    /// when the deadline expires the task is abandoned and the repository
    /// reports `TimedOut`. Backends that check the filter deadline stop on
    /// their own shortly after.
    pub async fn run(&self, repo: &RepositoryHandle, window: SearchWindow, author: &str) -> QueryOutcome {
        let timeout = self.config.timeout;
        let deadline = Instant::now() + timeout;
        let task = {
            let query = self.clone();
            let repo = repo.clone();
            let author = author.to_string();
            tokio::task::spawn_blocking(move || query.collect(&repo, window, &author, Some(deadline)))
        };

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(Some(commits)))) => QueryOutcome::Found {
                repo: repo.name().to_string(),
                commits,
            },
            Ok(Ok(Ok(None))) => QueryOutcome::Empty,
            Ok(Ok(Err(BackendError::DeadlineExceeded))) | Err(_) => {
                warn!("Query for {} timed out after {:?}", repo.name(), timeout);
                QueryOutcome::TimedOut
            }
            Ok(Ok(Err(e))) => {
                debug!("Query for {} failed: {}", repo.name(), e);
                QueryOutcome::Empty
            }
            Ok(Err(e)) => {
                warn!("Query task for {} panicked: {}", repo.name(), e);
                QueryOutcome::Empty
            }
        }
    }

    /// Blocking part of the query.
    ///
    /// Returns `Ok(None)` when the repository has no resolvable branches or no
    /// matching commits. Only `DeadlineExceeded` is returned as an error; every
    /// other backend failure is absorbed here.
    pub fn collect(
        &self,
        handle: &RepositoryHandle,
        window: SearchWindow,
        author: &str,
        deadline: Option<Instant>,
    ) -> Result<Option<Vec<Commit>>, BackendError> {
        let repo = match self.backend.open(handle.root()) {
            Ok(repo) => repo,
            Err(e) => {
                debug!("Cannot reopen {}: {}", handle.name(), e);
                return Ok(None);
            }
        };
        self.check_size(handle, &repo, deadline);

        let branches = self.resolve_branches(&repo);
        if branches.is_empty() {
            debug!("{} has no resolvable branches", handle.name());
            return Ok(None);
        }

        let mut filter = CommitFilter {
            author,
            since: window.since(),
            until: window.until(),
            max_count: self.config.max_commits,
            deadline,
        };

        let batches = match self.backend.iter_commits(&repo, RefSelector::All(&branches), &filter) {
            Ok(commits) => vec![commits],
            Err(BackendError::DeadlineExceeded) => return Err(BackendError::DeadlineExceeded),
            Err(e) => {
                debug!("Combined query failed for {} ({}), trying branches one by one", handle.name(), e);
                filter.max_count = self.config.max_commits_per_branch;
                let mut batches = Vec::with_capacity(branches.len());
                for branch in &branches {
                    match self.backend.iter_commits(&repo, RefSelector::Branch(branch), &filter) {
                        Ok(commits) => batches.push(commits),
                        Err(BackendError::DeadlineExceeded) => return Err(BackendError::DeadlineExceeded),
                        Err(e) => debug!("Skipping branch {} of {}: {}", branch, handle.name(), e),
                    }
                }
                batches
            }
        };

        let commits = dedup_commits(batches);
        if commits.is_empty() {
            Ok(None)
        } else {
            Ok(Some(commits))
        }
    }

    fn resolve_branches(&self, repo: &B::Repo) -> Vec<String> {
        match self.backend.list_refs(repo) {
            Ok(refs) if !refs.is_empty() => return refs,
            Ok(_) => {}
            Err(e) => debug!("Listing refs failed: {}", e),
        }
        self.config
            .default_branches
            .iter()
            .filter(|name| self.backend.has_ref(repo, name))
            .cloned()
            .collect()
    }

    /// Warn once per repository when its metadata directory is over the
    /// threshold. Returns the measured size the first time, `None` after that
    /// or when the check is disabled.
    fn check_size(&self, handle: &RepositoryHandle, repo: &B::Repo, deadline: Option<Instant>) -> Option<u64> {
        let threshold = self.config.size_warning_bytes?;
        let dir = self.backend.metadata_dir(repo)?;
        {
            let mut checked = self.size_checked.lock().unwrap_or_else(|e| e.into_inner());
            if !checked.insert(handle.root().to_path_buf()) {
                return None;
            }
        }
        let size = dir_size(&dir, deadline);
        if size > threshold {
            warn!(
                "{} is large ({}), searching it may be slow",
                handle.name(),
                format_size(size)
            );
        }
        Some(size)
    }
}

/// Flatten per-branch batches, keeping the first copy of each commit id,
/// newest first
fn dedup_commits(batches: Vec<Vec<Commit>>) -> Vec<Commit> {
    let mut seen = FxHashSet::default();
    let mut commits: Vec<Commit> = batches
        .into_iter()
        .flatten()
        .filter(|c| seen.insert(c.id.clone()))
        .collect();
    commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    commits
}

/// Total size of the files under `dir`; the walk stops early at `deadline`
fn dir_size(dir: &Path, deadline: Option<Instant>) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .take_while(|_| deadline.is_none_or(|d| Instant::now() < d))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
