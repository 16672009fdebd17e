use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// How a candidate repository directory was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoKind {
    Valid,
    Bare,
    Invalid,
}

/// A repository found during a directory scan. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    root: PathBuf,
    name: String,
    kind: RepoKind,
}

impl RepositoryHandle {
    pub fn new(root: impl Into<PathBuf>, kind: RepoKind) -> Self {
        let root = root.into();
        let name = crate::util::display_name(&root);
        Self { root, name, kind }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name used to group results: the directory name, or the full root path
    /// when another repository in the session has the same directory name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RepoKind {
        self.kind
    }

    pub fn is_valid(&self) -> bool {
        self.kind == RepoKind::Valid
    }
}

/// Give repositories that share a directory name their root path as name,
/// so their results are not grouped together
pub fn disambiguate_names(repos: &mut [RepositoryHandle]) {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for repo in repos.iter() {
        *counts.entry(repo.name.as_str()).or_default() += 1;
    }
    let clashing: Vec<bool> = repos.iter().map(|r| counts[r.name.as_str()] > 1).collect();
    for (repo, clash) in repos.iter_mut().zip(clashing) {
        if clash {
            repo.name = repo.root.display().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_names_unchanged() {
        let mut repos = vec![
            RepositoryHandle::new("/home/dev/code/api", RepoKind::Valid),
            RepositoryHandle::new("/home/dev/code/web", RepoKind::Valid),
        ];
        disambiguate_names(&mut repos);
        assert_eq!(repos[0].name(), "api");
        assert_eq!(repos[1].name(), "web");
    }

    #[test]
    fn test_clashing_names_use_root_path() {
        let mut repos = vec![
            RepositoryHandle::new("/home/dev/code/a/api", RepoKind::Valid),
            RepositoryHandle::new("/home/dev/code/web", RepoKind::Valid),
            RepositoryHandle::new("/home/dev/projects/api", RepoKind::Valid),
        ];
        disambiguate_names(&mut repos);
        assert_eq!(repos[0].name(), "/home/dev/code/a/api");
        assert_eq!(repos[1].name(), "web");
        assert_eq!(repos[2].name(), "/home/dev/projects/api");
    }
}
