mod commit;
mod repo;
mod result;
mod stats;
mod window;

pub use commit::{Commit, CommitId};
pub use repo::{RepoKind, RepositoryHandle, disambiguate_names};
pub use result::SearchResult;
pub use stats::SearchStats;
pub use window::SearchWindow;
