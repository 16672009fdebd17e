use std::path::Path;
use std::sync::Arc;

use super::backend::VcsBackend;
use crate::model::{RepoKind, RepositoryHandle};

/// Outcome of classifying one candidate directory
#[derive(Debug, Clone)]
pub struct Validation {
    pub handle: RepositoryHandle,
    /// Backend message when the repository could not be opened
    pub diagnostic: Option<String>,
}

/// Decides whether a directory holding `.git` is a usable repository
pub struct RepositoryValidator<B> {
    backend: Arc<B>,
}

impl<B: VcsBackend> RepositoryValidator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Classify `path`; never fails, open errors become `RepoKind::Invalid`
    pub fn classify(&self, path: &Path) -> Validation {
        match self.backend.open(path) {
            Ok(repo) if self.backend.is_bare(&repo) => Validation {
                handle: RepositoryHandle::new(path, RepoKind::Bare),
                diagnostic: None,
            },
            Ok(_) => Validation {
                handle: RepositoryHandle::new(path, RepoKind::Valid),
                diagnostic: None,
            },
            Err(e) => Validation {
                handle: RepositoryHandle::new(path, RepoKind::Invalid),
                diagnostic: Some(e.to_string()),
            },
        }
    }
}
