use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug};

use commitfinder::cli::{Cli, SearchRequest};
use commitfinder::config::SearchConfig;
use commitfinder::model::SearchResult;
use commitfinder::progress::{IndicatifProgress, NoopProgress, ProgressReporter};
use commitfinder::repository::{DirectoryScanner, GitBackend};
use commitfinder::search::{
    CommitQuery, DateWindowExpander, SearchScheduler, SessionContext, SessionEnd, SessionOutcome,
};
use commitfinder::view::{ConsoleOperator, render_stats};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let code = match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    };
    // Abandoned queries and a pending prompt read must not hold up exit
    runtime.shutdown_background();
    code
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = SearchConfig::load(cli.config.as_deref()).context("Could not load configuration")?;
    cli.apply_overrides(&mut config);

    let request = match cli.into_request(&config, Local::now().date_naive()) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    debug!("Request: {:?}", request);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let progress: Arc<dyn ProgressReporter> = if request.progress {
        Arc::new(IndicatifProgress)
    } else {
        Arc::new(NoopProgress)
    };
    let backend = Arc::new(GitBackend);
    let ctx = Arc::new(SessionContext::new());

    // Phase 1: find repositories
    let scan = {
        let scanner = DirectoryScanner::new(Arc::clone(&backend), config.skip_dirs.clone(), Arc::clone(&progress));
        let roots = request.roots.clone();
        let ctx = Arc::clone(&ctx);
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || scanner.scan(&roots, &ctx, &cancel))
            .await
            .context("Directory scan failed")?
    };
    if scan.cancelled {
        println!("Cancelled after finding {} repositories.", scan.repositories.len());
        report_stats(&request, &ctx);
        return Ok(ExitCode::SUCCESS);
    }
    if !request.json {
        println!("\nFound {} repositories to search", scan.repositories.len());
    }

    // Phase 2: search, widening on request
    let query = CommitQuery::new(backend, config.query_config());
    let scheduler = SearchScheduler::new(query, config.jobs, progress);
    let expander = DateWindowExpander::new(
        &scheduler,
        &scan.repositories,
        config.expander_config(),
        Local::now().date_naive(),
    );
    let mut operator = ConsoleOperator::new(request.json, request.auto_accept);
    let outcome = expander
        .run(request.date, &request.author, &ctx, &mut operator, &cancel)
        .await;

    if request.json {
        print_json(&request, &outcome)?;
    } else if outcome.end == SessionEnd::Cancelled {
        println!("\nCancelled. {} commit(s) found before the interrupt.", outcome.total_commits);
    }
    report_stats(&request, &ctx);
    Ok(ExitCode::SUCCESS)
}

fn report_stats(request: &SearchRequest, ctx: &SessionContext) {
    if request.verbose {
        eprint!("{}", render_stats(&ctx.stats()));
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    author: &'a str,
    date: String,
    rounds: u32,
    cancelled: bool,
    total_commits: usize,
    repositories: &'a SearchResult,
}

fn print_json(request: &SearchRequest, outcome: &SessionOutcome) -> Result<()> {
    let report = JsonReport {
        author: &request.author,
        date: request.date.to_string(),
        rounds: outcome.rounds,
        cancelled: outcome.end == SessionEnd::Cancelled,
        total_commits: outcome.total_commits,
        repositories: &outcome.result,
    };
    println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize result")?);
    Ok(())
}
