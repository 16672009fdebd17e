mod backend;
mod git;
mod memory;
mod scanner;
mod validator;

pub use backend::{CommitFilter, RefSelector, VcsBackend};
pub use git::GitBackend;
pub use memory::{MemoryBackend, MemoryRepo};
pub use scanner::{DirectoryScanner, GIT_DIR, ScanOutcome};
pub use validator::{RepositoryValidator, Validation};
