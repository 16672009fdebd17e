//! In-memory [`VcsBackend`] for tests and benchmarks
//!
//! Repositories are registered under the path a scanner would find them at.
//! Each one can be made bare, broken, slow, or made to fail the combined
//! all-refs query so the fallback paths can be exercised without git.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::backend::{CommitFilter, RefSelector, VcsBackend};
use crate::error::BackendError;
use crate::model::Commit;

/// A fake repository: branches mapped to the commits reachable from them
#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    bare: bool,
    branches: BTreeMap<String, Vec<Commit>>,
    unlisted_refs: bool,
    fail_combined: bool,
    failing_branches: FxHashSet<String>,
    delay: Option<Duration>,
    metadata_dir: Option<PathBuf>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn branch(mut self, name: &str, commits: Vec<Commit>) -> Self {
        self.branches.insert(name.to_string(), commits);
        self
    }

    pub fn bare(mut self) -> Self {
        self.bare = true;
        self
    }

    /// Ref listing comes back empty; branches can still be probed by name
    pub fn unlisted_refs(mut self) -> Self {
        self.unlisted_refs = true;
        self
    }

    /// The combined all-refs walk fails as unsupported
    pub fn fail_combined(mut self) -> Self {
        self.fail_combined = true;
        self
    }

    /// Walking this branch on its own fails
    pub fn failing_branch(mut self, name: &str) -> Self {
        self.failing_branches.insert(name.to_string());
        self
    }

    /// Every commit walk takes this long (cut short by the filter deadline)
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report `dir` as the repository's metadata directory
    pub fn metadata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.metadata_dir = Some(dir.into());
        self
    }

    fn wait(&self, filter: &CommitFilter<'_>) -> Result<(), BackendError> {
        let Some(delay) = self.delay else {
            return Ok(());
        };
        let until = Instant::now() + delay;
        while Instant::now() < until {
            if filter.deadline_passed() {
                return Err(BackendError::DeadlineExceeded);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    repos: FxHashMap<PathBuf, MemoryRepo>,
    broken: FxHashSet<PathBuf>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, repo: MemoryRepo) {
        self.repos.insert(path.into(), repo);
    }

    /// Register a path whose repository fails to open
    pub fn insert_broken(&mut self, path: impl Into<PathBuf>) {
        self.broken.insert(path.into());
    }
}

impl VcsBackend for MemoryBackend {
    type Repo = MemoryRepo;

    fn open(&self, path: &Path) -> Result<MemoryRepo, BackendError> {
        if self.broken.contains(path) {
            return Err(BackendError::Open(format!("corrupt repository at {}", path.display())));
        }
        self.repos
            .get(path)
            .cloned()
            .ok_or_else(|| BackendError::Open(format!("no repository at {}", path.display())))
    }

    fn is_bare(&self, repo: &MemoryRepo) -> bool {
        repo.bare
    }

    fn list_refs(&self, repo: &MemoryRepo) -> Result<Vec<String>, BackendError> {
        if repo.unlisted_refs {
            return Ok(Vec::new());
        }
        Ok(repo.branches.keys().cloned().collect())
    }

    fn has_ref(&self, repo: &MemoryRepo, name: &str) -> bool {
        repo.branches.contains_key(name)
    }

    fn metadata_dir(&self, repo: &MemoryRepo) -> Option<PathBuf> {
        repo.metadata_dir.clone()
    }

    fn iter_commits(
        &self,
        repo: &MemoryRepo,
        refs: RefSelector<'_>,
        filter: &CommitFilter<'_>,
    ) -> Result<Vec<Commit>, BackendError> {
        repo.wait(filter)?;

        let names: Vec<&str> = match refs {
            RefSelector::All(names) => {
                if repo.fail_combined {
                    return Err(BackendError::Unsupported("combined ref walk".to_string()));
                }
                names.iter().map(String::as_str).collect()
            }
            RefSelector::Branch(name) => {
                if repo.failing_branches.contains(name) {
                    return Err(BackendError::Walk(format!("cannot walk {}", name)));
                }
                vec![name]
            }
        };

        let mut seen = FxHashSet::default();
        let mut matched: Vec<Commit> = Vec::new();
        for name in names {
            let commits = repo
                .branches
                .get(name)
                .ok_or_else(|| BackendError::RefNotFound(name.to_string()))?;
            for commit in commits {
                if filter.matches(commit) && seen.insert(commit.id.clone()) {
                    matched.push(commit.clone());
                }
            }
        }
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(filter.max_count);
        Ok(matched)
    }
}
