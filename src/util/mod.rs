mod format;
mod path;

pub use format::{format_duration, format_size, format_timestamp};
pub use path::{display_name, expand_tilde};
