// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use chrono::NaiveDate;
use commitfinder::model::{Commit, CommitId, SearchWindow};
use git2::{Oid, Repository, Signature, Time};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const AUTHOR_NAME: &str = "Test User";
pub const AUTHOR_EMAIL: &str = "test@example.com";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Unix seconds for `hour` o'clock local time on `day`
pub fn at(day: NaiveDate, hour: i64) -> i64 {
    SearchWindow::for_day(day).since() + hour * 3600
}

/// Create a temporary git repository with configured user
pub fn create_test_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = init_repo(&repo_path);
    (dir, repo_path, repo)
}

/// Initialise a git repository at `path`, creating parent directories
pub fn init_repo(path: &Path) -> Repository {
    std::fs::create_dir_all(path).unwrap();
    let repo = Repository::init(path).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", AUTHOR_NAME).unwrap();
    config.set_str("user.email", AUTHOR_EMAIL).unwrap();

    repo
}

/// Create a commit on `refname` (e.g. "HEAD" or "refs/heads/feature") with a
/// fixed author and commit time. The tree is carried over from the parent.
pub fn commit_on(
    repo: &Repository,
    refname: &str,
    name: &str,
    email: &str,
    time: i64,
    message: &str,
) -> Oid {
    let sig = Signature::new(name, email, &Time::new(time, 0)).unwrap();

    let parent = repo
        .find_reference(refname)
        .ok()
        .and_then(|r| r.resolve().ok())
        .and_then(|r| r.peel_to_commit().ok())
        .or_else(|| {
            if refname == "HEAD" {
                repo.head().ok().and_then(|h| h.peel_to_commit().ok())
            } else {
                None
            }
        });

    let tree = match &parent {
        Some(p) => p.tree().unwrap(),
        None => {
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            repo.find_tree(tree_id).unwrap()
        }
    };

    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some(refname), &sig, &sig, message, &tree, &parents).unwrap()
}

/// Commit by the default test author on HEAD
pub fn commit_at(repo: &Repository, time: i64, message: &str) -> Oid {
    commit_on(repo, "HEAD", AUTHOR_NAME, AUTHOR_EMAIL, time, message)
}

/// Point a new branch at `oid`
pub fn branch_at(repo: &Repository, name: &str, oid: Oid) {
    let commit = repo.find_commit(oid).unwrap();
    repo.branch(name, &commit, false).unwrap();
}

/// An in-memory commit by the default test author
pub fn commit(id: &str, timestamp: i64) -> Commit {
    Commit {
        id: CommitId::new(id),
        author_name: AUTHOR_NAME.to_string(),
        author_email: AUTHOR_EMAIL.to_string(),
        timestamp,
        summary: format!("commit {}", id),
    }
}

/// Create `path/.git` as an empty marker directory
pub fn mark_repo(path: &Path) {
    std::fs::create_dir_all(path.join(".git")).unwrap();
}
