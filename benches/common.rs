// Shared benchmark helpers
// Functions here are used across different benchmark files
#![allow(dead_code)]

use commitfinder::model::{Commit, CommitId, RepoKind, RepositoryHandle};
use commitfinder::repository::{MemoryBackend, MemoryRepo};
use git2::{Repository, Signature, Time};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const BENCH_EMAIL: &str = "bench@example.com";

/// Build a directory tree with `num_repos` repository markers spread across
/// nested project folders, plus a dependency folder next to each that the
/// scanner is expected to skip
pub fn generate_tree(num_repos: usize) -> (TempDir, MemoryBackend) {
    let dir = TempDir::new().unwrap();
    let mut backend = MemoryBackend::new();
    let groups = ["work", "personal", "forks", "archive"];

    for i in 0..num_repos {
        let project = dir
            .path()
            .join(groups[i % groups.len()])
            .join(format!("team_{}", i / 20))
            .join(format!("project_{}", i));
        std::fs::create_dir_all(project.join(".git")).unwrap();
        std::fs::create_dir_all(project.join("src").join("module")).unwrap();
        std::fs::create_dir_all(project.join("node_modules").join("dep")).unwrap();
        backend.insert(&project, MemoryRepo::new());

        let plain = dir.path().join(groups[i % groups.len()]).join(format!("notes_{}", i));
        std::fs::create_dir_all(plain.join("drafts")).unwrap();
    }

    (dir, backend)
}

/// Commits by the bench author, one per hour counting back from `newest`
pub fn generate_commits(prefix: &str, count: usize, newest: i64) -> Vec<Commit> {
    (0..count)
        .map(|i| Commit {
            id: CommitId::new(format!("{}{:08x}", prefix, i)),
            author_name: "Bench User".to_string(),
            author_email: if i % 3 == 0 { "other@example.com" } else { BENCH_EMAIL }.to_string(),
            timestamp: newest - (i as i64) * 3600,
            summary: format!("Commit {}", i),
        })
        .collect()
}

/// In-memory repositories with `commits_per_repo` commits each
pub fn generate_repos(num_repos: usize, commits_per_repo: usize, newest: i64) -> (MemoryBackend, Vec<RepositoryHandle>) {
    let mut backend = MemoryBackend::new();
    let mut handles = Vec::with_capacity(num_repos);
    for i in 0..num_repos {
        let path = PathBuf::from(format!("/bench/repo_{}", i));
        let repo = MemoryRepo::new()
            .branch("main", generate_commits(&format!("m{}_", i), commits_per_repo, newest))
            .branch("feature", generate_commits(&format!("f{}_", i), commits_per_repo / 4, newest));
        backend.insert(&path, repo);
        handles.push(RepositoryHandle::new(path, RepoKind::Valid));
    }
    (backend, handles)
}

/// Create a temporary git repository for benchmarks
pub fn create_bench_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Bench User").unwrap();
    config.set_str("user.email", BENCH_EMAIL).unwrap();

    (dir, repo_path, repo)
}

/// Create an empty-tree commit on HEAD at a fixed time
pub fn add_commit(repo: &Repository, email: &str, time: i64, message: &str) -> git2::Oid {
    let sig = Signature::new("Bench User", email, &Time::new(time, 0)).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let tree = match &parent {
        Some(p) => p.tree().unwrap(),
        None => {
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            repo.find_tree(tree_id).unwrap()
        }
    };

    if let Some(parent) = parent {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent]).unwrap()
    } else {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[]).unwrap()
    }
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}
