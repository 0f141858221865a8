//! Install-tree clearing ahead of a full install.

use std::path::Path;

use crate::FileOpsError;

/// Recursively deletes the contents of `dir`, leaving `dir` itself in place.
///
/// Returns the number of top-level entries removed; clearing an empty
/// directory succeeds with 0. Full installs expect an empty destination, so
/// this runs as an explicit pre-step rather than extraction silently
/// overwriting whatever is there.
pub fn clear_directory(dir: &Path) -> Result<usize, FileOpsError> {
    if !dir.exists() {
        return Err(FileOpsError::PathNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(FileOpsError::NotADirectory(dir.to_path_buf()));
    }

    let mut removed = 0usize;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
        removed += 1;
    }

    tracing::info!(dir = %dir.display(), removed, "cleared directory contents");
    Ok(removed)
}
