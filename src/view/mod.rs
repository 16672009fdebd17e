//! Terminal presentation: result listings, expansion prompts and the
//! verbose statistics table.

mod console;
mod stats;

pub use console::{ConsoleOperator, parse_confirmation, render_round};
pub use stats::render_stats;
