//! Command handlers for the `caption-gemini` binary.

pub mod config;
pub mod describe;
pub mod run;

use std::path::PathBuf;

/// Expand a leading `~` in a user-supplied path.
pub(crate) fn expand_path(path: &std::path::Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
