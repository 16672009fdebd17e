use std::path::{Path, PathBuf};

use crate::error::InputError;

/// Expand a leading `~` to the home directory
pub fn expand_tilde(raw: &str) -> Result<PathBuf, InputError> {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return Ok(PathBuf::from(raw)),
    };
    let home = dirs::home_dir().ok_or_else(|| InputError::NoHomeDir(raw.to_string()))?;
    let rest = rest.trim_start_matches(['/', '\\']);
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Name shown for a repository: its directory name, or the whole path for roots
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
