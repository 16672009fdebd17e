use crossterm::style::Stylize;
use std::fmt::Write as _;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;

use crate::model::Commit;
use crate::search::{Decision, Operator, RoundReport};
use crate::util::format_timestamp;

/// Render one round for the terminal.
///
/// The exact-date round lists what was found on that day. Expansion rounds
/// list the cumulative result and mark commits first found in this round.
pub fn render_round(report: &RoundReport<'_>) -> String {
    let mut out = String::new();

    if report.round == 0 {
        if report.cumulative.is_empty() {
            let _ = writeln!(out, "\n{}", format!("No commits found on {}.", report.date).yellow());
        } else {
            let _ = writeln!(out, "\n{}", format!("Found commits on {}:", report.date).green().bold());
            write_repos(&mut out, report, false);
        }
    } else {
        let days: Vec<String> = report.windows.iter().map(|w| w.day.to_string()).collect();
        let _ = writeln!(
            out,
            "\n{} {}",
            format!("Round {} (±{} day(s)):", report.round, report.round).bold(),
            days.join(", ").blue()
        );
        if report.new_ids.is_empty() {
            let _ = writeln!(out, "{}", "No new commits this round.".yellow());
        } else {
            let _ = writeln!(out, "{}", format!("{} new commit(s).", report.new_ids.len()).green());
        }
        if !report.cumulative.is_empty() {
            write_repos(&mut out, report, true);
        }
    }

    if !report.timed_out.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            format!("Timed out: {}", report.timed_out.join(", ")).dark_yellow()
        );
    }
    if report.interrupted {
        let _ = writeln!(out, "{}", "Search interrupted; showing partial results.".red());
    }
    let _ = writeln!(
        out,
        "{}",
        format!(
            "Total: {} commit(s) in {} repositories",
            report.cumulative.total_commits(),
            report.cumulative.repo_count()
        )
        .dim()
    );
    out
}

fn write_repos(out: &mut String, report: &RoundReport<'_>, flag_new: bool) {
    for (name, commits) in report.cumulative.iter() {
        let _ = writeln!(out, "\n{}", name.bold());
        for commit in commits {
            let _ = writeln!(out, "  {}", format_commit(commit, flag_new && report.is_new(&commit.id)));
        }
    }
}

fn format_commit(commit: &Commit, is_new: bool) -> String {
    let mut line = format!(
        "{} {} {}",
        commit.id.short().dim(),
        format_timestamp(commit.timestamp).cyan(),
        commit.summary
    );
    if is_new {
        let _ = write!(line, " {}", "[new]".green().bold());
    }
    line
}

/// Interpret an answer to a yes/no prompt; empty means yes
pub fn parse_confirmation(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" | "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Operator backed by the terminal: prints rounds to stdout and reads
/// expansion answers from stdin
pub struct ConsoleOperator {
    /// Print nothing; the caller reports the final result itself
    quiet: bool,
    auto_accept: bool,
}

impl ConsoleOperator {
    pub fn new(quiet: bool, auto_accept: bool) -> Self {
        Self { quiet, auto_accept }
    }

    async fn ask(&self, question: String) -> io::Result<Option<String>> {
        tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
            let mut stderr = io::stderr();
            write!(stderr, "{}", question)?;
            stderr.flush()?;
            let mut line = String::new();
            let read = io::stdin().read_line(&mut line)?;
            Ok((read > 0).then_some(line))
        })
        .await
        .map_err(io::Error::other)?
    }
}

impl Operator for ConsoleOperator {
    fn present(&mut self, report: &RoundReport<'_>) {
        if !self.quiet {
            print!("{}", render_round(report));
        }
    }

    async fn confirm_expand(&mut self, offset: u32, cancel: &CancellationToken) -> Decision {
        if self.auto_accept {
            return Decision::Accept;
        }
        let question = format!("\nExpand the search to ±{} day(s)? [Y/n] ", offset);
        loop {
            // The blocking read cannot be interrupted; on cancel it is left behind.
            let answer = tokio::select! {
                _ = cancel.cancelled() => return Decision::Cancelled,
                answer = self.ask(question.clone()) => answer,
            };
            match answer {
                Ok(Some(line)) => match parse_confirmation(&line) {
                    Some(true) => return Decision::Accept,
                    Some(false) => return Decision::Decline,
                    None => eprintln!("Please answer y or n."),
                },
                // EOF or a closed stdin cannot accept
                Ok(None) | Err(_) => return Decision::Decline,
            }
        }
    }
}
