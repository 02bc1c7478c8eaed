//! Upward search for project-local configuration files.

use std::path::{Path, PathBuf};
use tracing::trace;

/// Ancestors visited at most, not counting the start directory.
pub const MAX_BUBBLE_STEPS: usize = 100;

/// Find `relative` in `start_dir` or the nearest ancestor that has it.
///
/// The walk stops at `home` or the filesystem root, whichever comes first;
/// the stop directory itself is still checked.
pub fn find_in_parent_directories(
    relative: &Path,
    start_dir: &Path,
    home: Option<&Path>,
) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    if let Some(found) = check(&current, relative) {
        return Some(found);
    }

    for _ in 0..MAX_BUBBLE_STEPS {
        if home == Some(current.as_path()) {
            break;
        }
        let parent = current.parent()?.to_path_buf();
        if parent == current {
            break;
        }
        current = parent;
        if let Some(found) = check(&current, relative) {
            return Some(found);
        }
    }

    None
}

fn check(dir: &Path, relative: &Path) -> Option<PathBuf> {
    let candidate = dir.join(relative);
    trace!(path = %candidate.display(), "bubble check");
    candidate.exists().then_some(candidate)
}
