//! Filesystem operations for install staging and finalization.
//!
//! Free-space pre-checks, install-tree clearing, full-archive extraction
//! and the post-install symlink table. Everything here operates on paths
//! handed down by the orchestrator; nothing resolves game locations itself.

mod clear;
mod extract;
mod space;
mod symlink;

pub use clear::clear_directory;
pub use extract::extract_archive;
pub use space::{SpaceCategory, SpaceChecker, SpaceVerdict};
pub use symlink::{DEFAULT_LINKS, SymlinkManager};

/// Errors produced by filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path not found: {0}")]
    PathNotFound(std::path::PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(std::path::PathBuf),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("unsafe archive entry path: {0}")]
    UnsafeEntryPath(String),

    #[error("symlink source missing: {0}")]
    MissingLinkSource(std::path::PathBuf),
}
