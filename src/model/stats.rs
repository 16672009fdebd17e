use std::time::Duration;

/// Counters accumulated over one session.
///
/// Every field only ever grows; readers may take a snapshot at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    pub directories_scanned: u64,
    pub directories_skipped: u64,
    pub git_dirs_found: u64,
    pub invalid_repos: u64,
    pub bare_repos: u64,
    pub repos_searched: u64,
    pub repos_timed_out: u64,
    /// Elapsed time of each repository query, in completion order
    pub repo_durations: Vec<(String, Duration)>,
}

impl SearchStats {
    pub fn valid_repos(&self) -> u64 {
        self.git_dirs_found
            .saturating_sub(self.invalid_repos)
            .saturating_sub(self.bare_repos)
    }

    pub fn total_search_time(&self) -> Duration {
        self.repo_durations.iter().map(|(_, d)| *d).sum()
    }

    /// The `n` slowest repository queries, slowest first
    pub fn slowest(&self, n: usize) -> Vec<(&str, Duration)> {
        let mut durations: Vec<_> = self
            .repo_durations
            .iter()
            .map(|(name, d)| (name.as_str(), *d))
            .collect();
        durations.sort_by(|a, b| b.1.cmp(&a.1));
        durations.truncate(n);
        durations
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
