//! Terminal failure of one update cycle.

use kobuk_downloader::DownloadError;
use kobuk_file_ops::{FileOpsError, SpaceCategory};
use kobuk_manifest::ManifestError;
use kobuk_patcher::PatchError;

/// Every stage failure surfaces as exactly one of these; the orchestrator
/// never catches and continues across stages.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("no such version in manifest: {0}")]
    UnknownVersion(String),

    #[error("insufficient free space: {required} bytes required on the {category:?} volume")]
    InsufficientSpace {
        required: u64,
        category: SpaceCategory,
    },

    #[error("free space query failed: {0}")]
    SpaceQuery(FileOpsError),

    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("signature verification failed: {0}")]
    PatchVerify(PatchError),

    #[error("patch application failed: {0}")]
    PatchApply(PatchError),

    #[error("install failed: {0}")]
    Extract(FileOpsError),

    #[error("symlink setup failed: {0}")]
    Symlink(FileOpsError),

    #[error("staging directory unavailable: {0}")]
    Staging(FileOpsError),
}

impl UpdateError {
    /// Stable terminal code surfaced to the embedding client. A completed
    /// cycle reports 0.
    pub fn code(&self) -> i32 {
        match self {
            UpdateError::InsufficientSpace { .. } => 1,
            UpdateError::Download(_) => 2,
            UpdateError::PatchVerify(_) => 3,
            UpdateError::PatchApply(_) => 4,
            UpdateError::Extract(_) => 5,
            UpdateError::Symlink(_) => 6,
            UpdateError::Manifest(_) => 7,
            UpdateError::UnknownVersion(_) => 8,
            UpdateError::SpaceQuery(_) => 9,
            UpdateError::Staging(_) => 10,
        }
    }
}
