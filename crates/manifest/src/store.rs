//! Manifest fetch and version lookup.

use crate::{ManifestDocument, ManifestError, PatchRecord, VersionRecord};

/// Default manifest endpoint.
pub const DEFAULT_SOURCE_URL: &str = "https://wiki.kobuk.games/deploy/versions.json";

/// Read-only view over a parsed manifest.
///
/// Lookups are pure: the same label always yields the same record for the
/// lifetime of the store. Transport retries are the fetch layer's concern,
/// not this trait's.
pub trait ManifestStore: Send + Sync {
    /// The manifest's designated newest build.
    fn latest(&self) -> Option<VersionRecord>;

    /// Exact-match lookup by version label.
    fn version(&self, label: &str) -> Option<VersionRecord>;

    /// Patch toward `label` from the currently installed build.
    fn patch(&self, label: &str) -> Option<PatchRecord>;
}

/// Manifest fetched from the remote source once and held parsed.
#[derive(Debug, Clone)]
pub struct RemoteManifest {
    doc: ManifestDocument,
}

impl RemoteManifest {
    /// Fetches and parses the manifest from `url`.
    pub async fn fetch(url: &str) -> Result<Self, ManifestError> {
        let resp = reqwest::get(url).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ManifestError::Status(status.as_u16()));
        }
        let body = resp.text().await?;

        let manifest = Self::from_json(&body)?;
        tracing::info!(
            url,
            versions = manifest.doc.versions.len(),
            patches = manifest.doc.patches.len(),
            latest = %manifest.doc.latest,
            "manifest fetched"
        );
        Ok(manifest)
    }

    /// Parses a manifest from raw JSON.
    pub fn from_json(raw: &str) -> Result<Self, ManifestError> {
        let doc: ManifestDocument = serde_json::from_str(raw)?;
        Ok(Self { doc })
    }

    /// The underlying parsed document.
    pub fn document(&self) -> &ManifestDocument {
        &self.doc
    }
}

impl ManifestStore for RemoteManifest {
    fn latest(&self) -> Option<VersionRecord> {
        self.doc.versions.get(&self.doc.latest).cloned()
    }

    fn version(&self, label: &str) -> Option<VersionRecord> {
        self.doc.versions.get(label).cloned()
    }

    fn patch(&self, label: &str) -> Option<PatchRecord> {
        self.doc.patches.get(label).cloned()
    }
}
