//! Session-wide mutable state
//!
//! Stats and the seen-commit set are shared by whichever unit of work is
//! running, so both sit behind a mutex. The context is created once per
//! session and passed explicitly to the scanner, scheduler and expander.

use rustc_hash::FxHashSet;
use std::sync::{Mutex, MutexGuard};

use crate::model::{CommitId, SearchStats};

/// Commit ids reported so far; grows monotonically
#[derive(Debug, Default)]
pub struct SeenCommitSet {
    ids: FxHashSet<CommitId>,
}

impl SeenCommitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`, returning true only the first time it is seen
    pub fn insert(&mut self, id: &CommitId) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.clone())
    }

    pub fn contains(&self, id: &CommitId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SessionContext {
    stats: Mutex<SearchStats>,
    seen: Mutex<SeenCommitSet>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current counters
    pub fn stats(&self) -> SearchStats {
        lock(&self.stats).clone()
    }

    pub fn update_stats(&self, f: impl FnOnce(&mut SearchStats)) {
        f(&mut lock(&self.stats));
    }

    /// Add `ids` to the seen set and return the ones not seen before
    pub fn mark_seen<'a>(&self, ids: impl IntoIterator<Item = &'a CommitId>) -> FxHashSet<CommitId> {
        let mut seen = lock(&self.seen);
        ids.into_iter()
            .filter(|id| seen.insert(id))
            .cloned()
            .collect()
    }

    pub fn seen_count(&self) -> usize {
        lock(&self.seen).len()
    }
}

// A panic while holding the lock leaves plain counters behind, which are
// still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_set_flags_once() {
        let ctx = SessionContext::new();
        let a = CommitId::new("a");
        let b = CommitId::new("b");

        let first = ctx.mark_seen([&a, &b]);
        assert_eq!(first.len(), 2);

        let second = ctx.mark_seen([&a]);
        assert!(second.is_empty());

        let c = CommitId::new("c");
        let third = ctx.mark_seen([&b, &c, &c]);
        assert_eq!(third.len(), 1);
        assert!(third.contains(&c));
        assert_eq!(ctx.seen_count(), 3);
    }

    #[test]
    fn test_stats_snapshot() {
        let ctx = SessionContext::new();
        ctx.update_stats(|s| s.directories_scanned += 3);
        ctx.update_stats(|s| s.directories_scanned += 1);
        assert_eq!(ctx.stats().directories_scanned, 4);
    }
}
