//! Version-control backend capability
//!
//! The search engine only talks to repositories through [`VcsBackend`], so it
//! can run against git2 on disk or against [`super::MemoryBackend`] in tests.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::BackendError;
use crate::model::Commit;

/// Which refs a commit walk starts from
#[derive(Debug, Clone, Copy)]
pub enum RefSelector<'a> {
    /// All of the given refs in one walk; commits reachable from several appear once
    All(&'a [String]),
    /// A single branch or ref
    Branch(&'a str),
}

/// Constraints on a commit walk
#[derive(Debug, Clone, Copy)]
pub struct CommitFilter<'a> {
    pub author: &'a str,
    /// Inclusive lower bound, Unix seconds
    pub since: i64,
    /// Inclusive upper bound, Unix seconds
    pub until: i64,
    pub max_count: usize,
    /// Backends should give up with `DeadlineExceeded` once this passes
    pub deadline: Option<Instant>,
}

impl CommitFilter<'_> {
    pub fn matches(&self, commit: &Commit) -> bool {
        (self.since..=self.until).contains(&commit.timestamp) && commit.is_authored_by(self.author)
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Read-only access to repositories
pub trait VcsBackend: Send + Sync + 'static {
    type Repo;

    fn open(&self, path: &Path) -> Result<Self::Repo, BackendError>;

    fn is_bare(&self, repo: &Self::Repo) -> bool;

    /// Names of all refs that resolve to a commit
    fn list_refs(&self, repo: &Self::Repo) -> Result<Vec<String>, BackendError>;

    /// Whether a (short or full) ref name resolves to a commit
    fn has_ref(&self, repo: &Self::Repo, name: &str) -> bool;

    /// Commits reachable from `refs` that match `filter`, at most `filter.max_count`
    fn iter_commits(
        &self,
        repo: &Self::Repo,
        refs: RefSelector<'_>,
        filter: &CommitFilter<'_>,
    ) -> Result<Vec<Commit>, BackendError>;

    /// On-disk metadata directory, used for the size warning
    fn metadata_dir(&self, _repo: &Self::Repo) -> Option<PathBuf> {
        None
    }
}
