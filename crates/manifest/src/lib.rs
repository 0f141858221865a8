//! Remote version manifest retrieval and lookup.
//!
//! The manifest is a JSON document published alongside the game content,
//! mapping version labels to full-archive builds and incremental patches.
//! This crate fetches and parses it; all update decisions live with the
//! orchestrator.

mod store;
mod types;

pub use store::{DEFAULT_SOURCE_URL, ManifestStore, RemoteManifest};
pub use types::{ManifestDocument, PatchRecord, VersionRecord};

/// Errors from fetching or parsing the manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("manifest endpoint returned HTTP {0}")]
    Status(u16),

    #[error("manifest malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}
