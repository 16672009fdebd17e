//! Progress reporting abstraction
//!
//! Decouples scanning and searching from UI concerns (indicatif).

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A handle to an active progress bar or spinner
pub trait ProgressHandle: Send + Sync {
    fn inc(&self, n: u64);
    fn set_message(&self, msg: String);
    fn finish(&self);
}

/// Factory for creating progress handles
pub trait ProgressReporter: Send + Sync {
    /// Start a bar of `total` steps, or a spinner when `total` is zero
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle>;
}

/// Indicatif-based progress reporter for CLI usage
pub struct IndicatifProgress;

impl ProgressReporter for IndicatifProgress {
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle> {
        let pb = if total == 0 {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template(&format!("{{spinner:.green}} {}... {{msg}}", label))
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(&format!(
                        "{{spinner:.green}} {}: [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {{msg}}",
                        label
                    ))
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        };
        Box::new(IndicatifHandle(pb))
    }
}

struct IndicatifHandle(ProgressBar);

impl ProgressHandle for IndicatifHandle {
    fn inc(&self, n: u64) {
        self.0.inc(n);
    }

    fn set_message(&self, msg: String) {
        self.0.set_message(msg);
    }

    fn finish(&self) {
        self.0.finish_and_clear();
    }
}

/// No-op progress reporter for tests, benchmarks and JSON output
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _label: &str, _total: u64) -> Box<dyn ProgressHandle> {
        Box::new(NoopHandle)
    }
}

struct NoopHandle;

impl ProgressHandle for NoopHandle {
    fn inc(&self, _n: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self) {}
}
