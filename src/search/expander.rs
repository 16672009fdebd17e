//! Adaptive date-window expansion
//!
//! The first round searches the requested day. When it comes back empty (or
//! the caller asked to keep going) the operator is asked whether to widen the
//! search. Round `k` searches the days `date - k` and `date + k`, the latter
//! clamped to today. Results accumulate across rounds; a commit is flagged as
//! new only in the round that first found it.
//!
//! ```text
//! Idle -> SearchingExact -> Present(0) -> Done | AwaitExpand(1)
//! AwaitExpand(k) -> Expanding(k) | Stopped | Cancelled
//! Expanding(k) -> SearchingOffsets(k) -> Present(k) -> AwaitExpand(k+1) | Stopped | Cancelled
//! ```

use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::scheduler::SearchScheduler;
use super::session::SessionContext;
use crate::model::{CommitId, RepositoryHandle, SearchResult, SearchWindow};
use crate::repository::VcsBackend;

/// Operator answer to an expansion prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline,
    Cancelled,
}

/// The collaborator that shows results and answers expansion prompts
#[allow(async_fn_in_trait)]
pub trait Operator {
    fn present(&mut self, report: &RoundReport<'_>);

    /// Ask whether to run expansion round `offset`.
    ///
    /// Implementations should return `Decision::Cancelled` once `cancel` fires.
    async fn confirm_expand(&mut self, offset: u32, cancel: &CancellationToken) -> Decision;
}

/// Result of searching one day within a round
#[derive(Debug, Clone)]
pub struct WindowResult {
    pub day: NaiveDate,
    pub result: SearchResult,
}

/// What a round found, handed to the operator for display
#[derive(Debug)]
pub struct RoundReport<'a> {
    /// 0 for the exact date, k for the k-th expansion
    pub round: u32,
    pub date: NaiveDate,
    pub windows: &'a [WindowResult],
    /// Everything found so far, including this round
    pub cumulative: &'a SearchResult,
    /// Ids first found in this round
    pub new_ids: &'a FxHashSet<CommitId>,
    pub timed_out: &'a [String],
    /// The round was cut short by an interrupt
    pub interrupted: bool,
}

impl RoundReport<'_> {
    pub fn is_new(&self, id: &CommitId) -> bool {
        self.new_ids.contains(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    Idle,
    SearchingExact,
    AwaitExpand(u32),
    Expanding(u32),
    SearchingOffsets(u32),
    Present(u32),
    Done,
    Stopped,
    Cancelled,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The exact date had commits and no further widening was requested
    Done,
    /// The operator declined, or the offset limit was reached
    Stopped,
    /// An interrupt arrived
    Cancelled,
}

#[derive(Debug)]
pub struct SessionOutcome {
    pub result: SearchResult,
    pub total_commits: usize,
    /// Expansion rounds completed after the exact-date round
    pub rounds: u32,
    pub end: SessionEnd,
}

#[derive(Debug, Clone, Default)]
pub struct ExpanderConfig {
    /// Stop after this expansion round without asking; `None` means no limit
    pub max_offset: Option<u32>,
    /// Offer expansion even when the exact date had commits
    pub keep_expanding: bool,
}

/// Data gathered by the round in progress
#[derive(Default)]
struct Round {
    windows: Vec<WindowResult>,
    new_ids: FxHashSet<CommitId>,
    timed_out: Vec<String>,
    interrupted: bool,
}

pub struct DateWindowExpander<'a, B> {
    scheduler: &'a SearchScheduler<B>,
    repos: &'a [RepositoryHandle],
    config: ExpanderConfig,
    today: NaiveDate,
}

impl<'a, B: VcsBackend> DateWindowExpander<'a, B> {
    /// `today` bounds forward offsets
    pub fn new(
        scheduler: &'a SearchScheduler<B>,
        repos: &'a [RepositoryHandle],
        config: ExpanderConfig,
        today: NaiveDate,
    ) -> Self {
        Self {
            scheduler,
            repos,
            config,
            today,
        }
    }

    /// The two windows searched by expansion round `offset`
    pub fn offset_windows(&self, date: NaiveDate, offset: u32) -> Vec<SearchWindow> {
        SearchWindow::days_before(date, offset)
            .into_iter()
            .chain(std::iter::once(SearchWindow::days_after_clamped(date, offset, self.today)))
            .collect()
    }

    /// Drive the session until it is done, stopped or cancelled
    pub async fn run<O: Operator>(
        &self,
        date: NaiveDate,
        author: &str,
        ctx: &SessionContext,
        operator: &mut O,
        cancel: &CancellationToken,
    ) -> SessionOutcome {
        let mut state = ExpansionState::Idle;
        let mut cumulative = SearchResult::new();
        let mut round = Round::default();
        let mut rounds = 0;

        loop {
            debug!("Expansion state: {:?}", state);
            state = match state {
                ExpansionState::Idle => ExpansionState::SearchingExact,
                ExpansionState::SearchingExact => {
                    let windows = [SearchWindow::for_day(date)];
                    round = self.search_round(&windows, author, ctx, cancel, &mut cumulative).await;
                    ExpansionState::Present(0)
                }
                ExpansionState::Present(k) => {
                    operator.present(&RoundReport {
                        round: k,
                        date,
                        windows: &round.windows,
                        cumulative: &cumulative,
                        new_ids: &round.new_ids,
                        timed_out: &round.timed_out,
                        interrupted: round.interrupted,
                    });
                    self.after_present(k, &round)
                }
                ExpansionState::AwaitExpand(k) => match operator.confirm_expand(k, cancel).await {
                    Decision::Accept => ExpansionState::Expanding(k),
                    Decision::Decline => ExpansionState::Stopped,
                    Decision::Cancelled => ExpansionState::Cancelled,
                },
                ExpansionState::Expanding(k) => {
                    info!("Expanding search to ±{} day(s) around {}", k, date);
                    ExpansionState::SearchingOffsets(k)
                }
                ExpansionState::SearchingOffsets(k) => {
                    let windows = self.offset_windows(date, k);
                    round = self.search_round(&windows, author, ctx, cancel, &mut cumulative).await;
                    rounds = k;
                    ExpansionState::Present(k)
                }
                ExpansionState::Done | ExpansionState::Stopped | ExpansionState::Cancelled => break,
            };
        }

        let end = match state {
            ExpansionState::Done => SessionEnd::Done,
            ExpansionState::Cancelled => SessionEnd::Cancelled,
            _ => SessionEnd::Stopped,
        };
        SessionOutcome {
            total_commits: cumulative.total_commits(),
            result: cumulative,
            rounds,
            end,
        }
    }

    fn after_present(&self, k: u32, round: &Round) -> ExpansionState {
        if round.interrupted {
            return ExpansionState::Cancelled;
        }
        let found_exact = k == 0 && round.windows.iter().any(|w| !w.result.is_empty());
        if found_exact && !self.config.keep_expanding {
            return ExpansionState::Done;
        }
        if self.config.max_offset.is_some_and(|max| k >= max) {
            return ExpansionState::Stopped;
        }
        ExpansionState::AwaitExpand(k + 1)
    }

    async fn search_round(
        &self,
        windows: &[SearchWindow],
        author: &str,
        ctx: &SessionContext,
        cancel: &CancellationToken,
        cumulative: &mut SearchResult,
    ) -> Round {
        let mut round = Round::default();
        for window in windows {
            if cancel.is_cancelled() {
                round.interrupted = true;
                break;
            }
            let outcome = self.scheduler.run(self.repos, *window, author, ctx, cancel).await;
            round.new_ids.extend(ctx.mark_seen(outcome.result.commit_ids()));
            cumulative.absorb(outcome.result.clone());
            round.timed_out.extend(outcome.timed_out);
            round.windows.push(WindowResult {
                day: window.day(),
                result: outcome.result,
            });
            if outcome.cancelled {
                round.interrupted = true;
                break;
            }
        }
        round
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgress;
    use crate::repository::MemoryBackend;
    use crate::search::{CommitQuery, QueryConfig};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scheduler() -> SearchScheduler<MemoryBackend> {
        let query = CommitQuery::new(Arc::new(MemoryBackend::new()), QueryConfig::default());
        SearchScheduler::new(query, 1, Arc::new(NoopProgress))
    }

    #[test]
    fn test_offset_windows() {
        let s = scheduler();
        let expander = DateWindowExpander::new(&s, &[], ExpanderConfig::default(), date(2024, 6, 1));
        let days: Vec<_> = expander
            .offset_windows(date(2024, 1, 5), 2)
            .iter()
            .map(SearchWindow::day)
            .collect();
        assert_eq!(days, vec![date(2024, 1, 3), date(2024, 1, 7)]);
    }

    #[test]
    fn test_offset_windows_clamped_to_today() {
        let s = scheduler();
        let today = date(2024, 1, 6);
        let expander = DateWindowExpander::new(&s, &[], ExpanderConfig::default(), today);
        for k in 1..5 {
            let windows = expander.offset_windows(date(2024, 1, 5), k);
            assert_eq!(windows.len(), 2);
            assert!(windows[1].day() <= today);
        }
    }

    #[test]
    fn test_after_present_transitions() {
        let s = scheduler();
        let found = Round {
            windows: vec![WindowResult {
                day: date(2024, 1, 5),
                result: {
                    let mut r = SearchResult::new();
                    r.merge(
                        "app",
                        vec![crate::model::Commit {
                            id: CommitId::new("a"),
                            author_name: "Dev".to_string(),
                            author_email: "dev@example.com".to_string(),
                            timestamp: 0,
                            summary: String::new(),
                        }],
                    );
                    r
                },
            }],
            ..Default::default()
        };
        let empty = Round::default();

        let plain = DateWindowExpander::new(&s, &[], ExpanderConfig::default(), date(2024, 6, 1));
        assert_eq!(plain.after_present(0, &found), ExpansionState::Done);
        assert_eq!(plain.after_present(0, &empty), ExpansionState::AwaitExpand(1));
        assert_eq!(plain.after_present(3, &found), ExpansionState::AwaitExpand(4));

        let eager = DateWindowExpander::new(
            &s,
            &[],
            ExpanderConfig {
                keep_expanding: true,
                max_offset: Some(2),
            },
            date(2024, 6, 1),
        );
        assert_eq!(eager.after_present(0, &found), ExpansionState::AwaitExpand(1));
        assert_eq!(eager.after_present(2, &empty), ExpansionState::Stopped);

        let interrupted = Round {
            interrupted: true,
            ..Default::default()
        };
        assert_eq!(plain.after_present(1, &interrupted), ExpansionState::Cancelled);
    }
}
