use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::config::SearchConfig;
use crate::error::InputError;
use crate::util::expand_tilde;

#[derive(Parser, Debug)]
#[command(
    name = "commitfinder",
    version,
    about = "Find your commits for a given day across all local git repositories"
)]
pub struct Cli {
    /// Date to search (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    pub date: Option<String>,

    /// Author e-mail or name to match
    #[arg(short, long, env = "COMMITFINDER_AUTHOR")]
    pub author: Option<String>,

    /// Show per-repository diagnostics and a statistics table
    #[arg(short, long)]
    pub verbose: bool,

    /// Single directory to search (takes precedence over --directories)
    #[arg(short = 'D', long)]
    pub directory: Option<String>,

    /// Directories to search, may be repeated
    #[arg(long = "directories", value_name = "PATH")]
    pub directories: Vec<String>,

    /// Config file (defaults to <config dir>/commitfinder/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Per-repository timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum commits retrieved per repository
    #[arg(long)]
    pub max_count: Option<usize>,

    /// Repositories searched concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Never widen the search beyond this many days
    #[arg(long, value_name = "DAYS")]
    pub max_offset: Option<u32>,

    /// Offer to widen the search even when the date itself has commits
    #[arg(long)]
    pub keep_expanding: bool,

    /// Accept every expansion prompt (requires --max-offset)
    #[arg(short, long)]
    pub yes: bool,

    /// Print the final result as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable progress spinners
    #[arg(long)]
    pub no_progress: bool,
}

/// Validated input for one search session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub date: NaiveDate,
    pub author: String,
    pub roots: Vec<PathBuf>,
    pub verbose: bool,
    pub json: bool,
    pub progress: bool,
    pub auto_accept: bool,
}

impl Cli {
    /// Apply CLI overrides to `config`
    pub fn apply_overrides(&self, config: &mut SearchConfig) {
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(max_count) = self.max_count {
            config.max_commits = max_count;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs.max(1);
        }
        if self.max_offset.is_some() {
            config.max_offset = self.max_offset;
        }
        if self.keep_expanding {
            config.keep_expanding = true;
        }
    }

    /// Validate input before any search starts
    pub fn into_request(self, config: &SearchConfig, today: NaiveDate) -> Result<SearchRequest, InputError> {
        let date = match self.date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => today,
        };

        let author = self
            .author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(InputError::MissingAuthor)?;

        if self.yes && config.max_offset.is_none() {
            return Err(InputError::UnboundedAutoAccept);
        }

        let roots = match (&self.directory, self.directories.is_empty()) {
            (Some(dir), _) => vec![expand_tilde(dir)?],
            (None, false) => self
                .directories
                .iter()
                .map(|d| expand_tilde(d))
                .collect::<Result<_, _>>()?,
            (None, true) => config.root_paths()?,
        };

        Ok(SearchRequest {
            date,
            author,
            roots,
            verbose: self.verbose,
            json: self.json,
            progress: !self.no_progress && !self.json,
            auto_accept: self.yes,
        })
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| InputError::InvalidDate(raw.to_string()))
}
