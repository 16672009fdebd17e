use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::query::{CommitQuery, QueryOutcome};
use super::session::SessionContext;
use crate::model::{RepositoryHandle, SearchResult, SearchWindow};
use crate::progress::ProgressReporter;
use crate::repository::VcsBackend;

/// Everything one window search produced, even if it was cut short
#[derive(Debug, Default)]
pub struct ScheduleOutcome {
    pub result: SearchResult,
    pub total_commits: usize,
    pub durations: Vec<(String, Duration)>,
    /// Repositories whose query hit the deadline
    pub timed_out: Vec<String>,
    pub cancelled: bool,
}

/// Runs a commit query over every repository for one window
pub struct SearchScheduler<B> {
    query: CommitQuery<B>,
    jobs: usize,
    progress: Arc<dyn ProgressReporter>,
}

impl<B: VcsBackend> SearchScheduler<B> {
    /// `jobs` bounds how many repositories are queried at once; 1 is sequential
    pub fn new(query: CommitQuery<B>, jobs: usize, progress: Arc<dyn ProgressReporter>) -> Self {
        Self {
            query,
            jobs: jobs.max(1),
            progress,
        }
    }

    /// Search all `repos` for commits by `author` within `window`.
    ///
    /// Cancellation is checked before each result is taken; an in-flight
    /// query is abandoned. Whatever was gathered before that is returned.
    pub async fn run(
        &self,
        repos: &[RepositoryHandle],
        window: SearchWindow,
        author: &str,
        ctx: &SessionContext,
        cancel: &CancellationToken,
    ) -> ScheduleOutcome {
        let mut outcome = ScheduleOutcome::default();
        let repos: Vec<&RepositoryHandle> = repos.iter().filter(|r| r.is_valid()).collect();
        let pb = self.progress.start(&format!("Searching {}", window.day()), repos.len() as u64);

        let mut pending = stream::iter(repos)
            .map(|repo| async move {
                let started = Instant::now();
                let result = self.query.run(repo, window, author).await;
                (repo, result, started.elapsed())
            })
            .buffer_unordered(self.jobs);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.cancelled = true;
                    break;
                }
                next = pending.next() => next,
            };
            let Some((repo, result, elapsed)) = next else {
                break;
            };
            pb.inc(1);

            let timed_out = result == QueryOutcome::TimedOut;
            ctx.update_stats(|s| {
                s.repos_searched += 1;
                s.repo_durations.push((repo.name().to_string(), elapsed));
                if timed_out {
                    s.repos_timed_out += 1;
                }
            });
            outcome.durations.push((repo.name().to_string(), elapsed));
            debug!("{} searched in {:?}", repo.name(), elapsed);

            match result {
                QueryOutcome::Found { repo: name, commits } => {
                    pb.set_message(format!("{}: {} commit(s)", name, commits.len()));
                    outcome.total_commits += outcome.result.merge(&name, commits);
                }
                QueryOutcome::TimedOut => outcome.timed_out.push(repo.name().to_string()),
                QueryOutcome::Empty => {}
            }
        }

        pb.finish();
        outcome
    }
}
