use std::fmt::Write as _;

use crate::model::SearchStats;
use crate::util::format_duration;

const SLOWEST_SHOWN: usize = 5;

/// Statistics table printed in verbose mode
pub fn render_stats(stats: &SearchStats) -> String {
    let rows = [
        ("Directories scanned", stats.directories_scanned.to_string()),
        ("Directories skipped", stats.directories_skipped.to_string()),
        ("Git directories found", stats.git_dirs_found.to_string()),
        ("Valid repositories", stats.valid_repos().to_string()),
        ("Invalid repositories", stats.invalid_repos.to_string()),
        ("Bare repositories", stats.bare_repos.to_string()),
        ("Repository queries", stats.repos_searched.to_string()),
        ("Timed out", stats.repos_timed_out.to_string()),
        ("Total search time", format_duration(stats.total_search_time())),
    ];
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let mut out = String::from("\nSearch statistics\n");
    for (label, value) in &rows {
        let _ = writeln!(out, "  {:<width$}  {:>10}", label, value, width = width);
    }

    let slowest = stats.slowest(SLOWEST_SHOWN);
    if !slowest.is_empty() {
        out.push_str("\nSlowest repositories\n");
        for (name, elapsed) in slowest {
            let _ = writeln!(out, "  {:<width$}  {:>10}", name, format_duration(elapsed), width = width);
        }
    }
    out
}
