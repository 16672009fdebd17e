//! Search engine: per-repository queries, scheduling across repositories and
//! adaptive widening of the date window.

mod expander;
mod query;
mod scheduler;
mod session;

pub use expander::{
    DateWindowExpander, Decision, ExpanderConfig, ExpansionState, Operator, RoundReport, SessionEnd,
    SessionOutcome, WindowResult,
};
pub use query::{CommitQuery, QueryConfig, QueryOutcome};
pub use scheduler::{ScheduleOutcome, SearchScheduler};
pub use session::{SeenCommitSet, SessionContext};
