// Commit query and scheduling benchmarks

use chrono::NaiveDate;
use commitfinder::model::{RepoKind, RepositoryHandle, SearchWindow};
use commitfinder::progress::NoopProgress;
use commitfinder::repository::GitBackend;
use commitfinder::search::{CommitQuery, QueryConfig, SearchScheduler, SessionContext};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

mod common;

fn window() -> SearchWindow {
    SearchWindow::for_day(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
}

fn bench_git_history_walk(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("query_git_history");
    group.sample_size(10);

    // Dense history around the searched day: 500 commits, one per hour
    let (_dir, repo_path, repo) = common::create_bench_repo();
    let newest = window().until() + 48 * 3600;
    for i in (0..500i64).rev() {
        let email = if i % 3 == 0 { "other@example.com" } else { common::BENCH_EMAIL };
        common::add_commit(&repo, email, newest - i * 3600, &format!("Commit {}", i));
    }
    let handle = RepositoryHandle::new(&repo_path, RepoKind::Valid);
    let query = CommitQuery::new(Arc::new(GitBackend), QueryConfig::default());

    group.bench_function("500_commits", |b| {
        b.iter(|| black_box(rt.block_on(query.run(&handle, window(), common::BENCH_EMAIL))));
    });

    group.finish();
}

fn bench_scheduler(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("scheduler_memory_repos");

    let (backend, handles) = common::generate_repos(100, 200, window().until());
    let backend = Arc::new(backend);

    for jobs in [1, 4, 16] {
        let query = CommitQuery::new(Arc::clone(&backend), QueryConfig::default());
        let scheduler = SearchScheduler::new(query, jobs, Arc::new(NoopProgress));

        group.bench_with_input(BenchmarkId::new("jobs", jobs), &handles, |b, handles| {
            b.iter(|| {
                let ctx = SessionContext::new();
                let outcome = rt.block_on(scheduler.run(
                    handles,
                    window(),
                    common::BENCH_EMAIL,
                    &ctx,
                    &CancellationToken::new(),
                ));
                black_box(outcome.total_commits)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_git_history_walk, bench_scheduler);
criterion_main!(benches);
