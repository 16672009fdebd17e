use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{Commit, CommitId};

/// Commits grouped by repository display name.
///
/// Within one repository the commit ids are unique and the list is kept
/// sorted newest first. Repository names iterate in sorted order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SearchResult {
    repos: BTreeMap<String, Vec<Commit>>,
}

impl SearchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge commits for a repository, skipping ids it already holds.
    ///
    /// Returns how many commits were actually added.
    pub fn merge(&mut self, repo_name: &str, commits: impl IntoIterator<Item = Commit>) -> usize {
        let entry = self.repos.entry(repo_name.to_string()).or_default();
        let mut known: FxHashSet<CommitId> = entry.iter().map(|c| c.id.clone()).collect();
        let before = entry.len();
        for commit in commits {
            if known.insert(commit.id.clone()) {
                entry.push(commit);
            }
        }
        let added = entry.len() - before;
        if entry.is_empty() {
            self.repos.remove(repo_name);
        } else if added > 0 {
            entry.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        }
        added
    }

    /// Merge another result into this one, returning the number of commits added
    pub fn absorb(&mut self, other: SearchResult) -> usize {
        other
            .repos
            .into_iter()
            .map(|(name, commits)| self.merge(&name, commits))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn repo_count(&self) -> usize {
        self.repos.len()
    }

    pub fn total_commits(&self) -> usize {
        self.repos.values().map(Vec::len).sum()
    }

    pub fn get(&self, repo_name: &str) -> Option<&[Commit]> {
        self.repos.get(repo_name).map(Vec::as_slice)
    }

    /// Repositories with their commits, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Commit])> + '_ {
        self.repos.iter().map(|(name, commits)| (name.as_str(), commits.as_slice()))
    }

    pub fn commit_ids(&self) -> impl Iterator<Item = &CommitId> + '_ {
        self.repos.values().flatten().map(|c| &c.id)
    }
}
