//! Full-version archive extraction into the install tree.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::FileOpsError;

/// Extracts a full-version archive into `dest`.
///
/// `expected_size` is the advertised uncompressed payload; the caller has
/// already space-checked it, it is logged here for diagnosis only. Entry
/// paths that are absolute or would escape `dest` are rejected before any
/// file is written.
pub fn extract_archive(
    archive: &Path,
    dest: &Path,
    expected_size: u64,
) -> Result<(), FileOpsError> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    std::fs::create_dir_all(dest)?;

    tracing::info!(
        archive = %archive.display(),
        dest = %dest.display(),
        entries = zip.len(),
        expected_size,
        "extracting archive"
    );

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let name = entry.name().to_owned();
        let target = dest.join(safe_entry_path(&name)?);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}

/// Validates that an archive entry path stays inside the destination.
fn safe_entry_path(name: &str) -> Result<PathBuf, FileOpsError> {
    let path = Path::new(name);
    if name.is_empty() || path.is_absolute() {
        return Err(FileOpsError::UnsafeEntryPath(name.to_owned()));
    }
    for component in path.components() {
        match component {
            Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                return Err(FileOpsError::UnsafeEntryPath(name.to_owned()));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(path.to_path_buf())
}
