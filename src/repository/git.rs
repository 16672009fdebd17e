//! git2-backed implementation of [`VcsBackend`]

use git2::{Repository, Sort};
use std::path::{Path, PathBuf};

use super::backend::{CommitFilter, RefSelector, VcsBackend};
use crate::error::BackendError;
use crate::model::{Commit, CommitId};

/// How many consecutive commits older than the window we walk past before
/// giving up. Commit dates are not strictly ordered across merges, so a
/// single old commit does not end the walk.
const OLD_COMMIT_SLOP: usize = 5;

const HEAD: &str = "HEAD";

/// Backend that reads repositories from disk with libgit2
#[derive(Debug, Default, Clone, Copy)]
pub struct GitBackend;

impl VcsBackend for GitBackend {
    type Repo = Repository;

    fn open(&self, path: &Path) -> Result<Repository, BackendError> {
        Repository::open(path).map_err(|e| BackendError::Open(e.message().to_string()))
    }

    fn is_bare(&self, repo: &Repository) -> bool {
        repo.is_bare()
    }

    /// Every ref under `refs/` that peels to a commit, plus `HEAD` when it is
    /// detached (a detached checkout or a rebase in progress)
    fn list_refs(&self, repo: &Repository) -> Result<Vec<String>, BackendError> {
        let references = repo.references().map_err(walk_err)?;
        let mut names = Vec::new();
        for reference in references.flatten() {
            if reference.peel_to_commit().is_err() {
                continue;
            }
            if let Some(name) = reference.name() {
                names.push(name.to_string());
            }
        }
        names.sort();
        if repo.head_detached().unwrap_or(false) && repo.head().and_then(|h| h.peel_to_commit()).is_ok() {
            names.push(HEAD.to_string());
        }
        Ok(names)
    }

    fn has_ref(&self, repo: &Repository, name: &str) -> bool {
        repo.resolve_reference_from_short_name(name)
            .and_then(|r| r.peel_to_commit())
            .is_ok()
    }

    fn iter_commits(
        &self,
        repo: &Repository,
        refs: RefSelector<'_>,
        filter: &CommitFilter<'_>,
    ) -> Result<Vec<Commit>, BackendError> {
        let mut revwalk = repo.revwalk().map_err(walk_err)?;
        revwalk.set_sorting(Sort::TIME).map_err(walk_err)?;

        match refs {
            RefSelector::All(names) => {
                for name in names {
                    revwalk.push(resolve(repo, name)?).map_err(walk_err)?;
                }
            }
            RefSelector::Branch(name) => {
                revwalk.push(resolve(repo, name)?).map_err(walk_err)?;
            }
        }

        let mut matched = Vec::new();
        let mut old_streak = 0;
        for oid in revwalk {
            if filter.deadline_passed() {
                return Err(BackendError::DeadlineExceeded);
            }
            let commit = repo.find_commit(oid.map_err(walk_err)?).map_err(walk_err)?;
            let time = commit.time().seconds();

            if time < filter.since {
                old_streak += 1;
                if old_streak > OLD_COMMIT_SLOP {
                    break;
                }
                continue;
            }
            old_streak = 0;
            if time > filter.until {
                continue;
            }

            let commit = to_commit(&commit);
            if commit.is_authored_by(filter.author) {
                matched.push(commit);
                if matched.len() >= filter.max_count {
                    break;
                }
            }
        }
        Ok(matched)
    }

    fn metadata_dir(&self, repo: &Repository) -> Option<PathBuf> {
        Some(repo.path().to_path_buf())
    }
}

fn to_commit(commit: &git2::Commit<'_>) -> Commit {
    let author = commit.author();
    Commit {
        id: CommitId::new(commit.id().to_string()),
        author_name: author.name().unwrap_or("unknown").to_string(),
        author_email: author.email().unwrap_or("").to_string(),
        timestamp: commit.time().seconds(),
        summary: commit.summary().unwrap_or("").to_string(),
    }
}

/// Full or short ref name to the commit it points at
fn resolve(repo: &Repository, name: &str) -> Result<git2::Oid, BackendError> {
    repo.resolve_reference_from_short_name(name)
        .and_then(|r| r.peel_to_commit())
        .map(|c| c.id())
        .map_err(|_| BackendError::RefNotFound(name.to_string()))
}

fn walk_err(e: git2::Error) -> BackendError {
    BackendError::Walk(e.message().to_string())
}
