use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One installable full-archive build.
///
/// Both size fields are known before any download starts; the orchestrator
/// uses them for space pre-checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub file_name: String,
    pub download_url: String,
    pub download_size: u64,
    pub extract_size: u64,
    /// Remote reference the patch tool verifies and heals against.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub heal_url: String,
    pub version: String,
    pub signature: String,
}

/// One incremental patch from the currently installed build to a target
/// version. Only meaningful when an installed build and its signature are
/// known; patches are deltas, not standalone installs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRecord {
    pub url: String,
    pub file_name: String,
    /// Scratch bytes the patch tool needs in staging while applying.
    pub temp_required: u64,
}

/// Parsed remote manifest document.
///
/// `versions` is keyed by version label; `patches` by the *target* label
/// (the source is implicitly the installed build).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    /// Label of the designated newest build. The manifest defines ordering;
    /// nothing here infers it from labels.
    pub latest: String,
    pub versions: BTreeMap<String, VersionRecord>,
    #[serde(default)]
    pub patches: BTreeMap<String, PatchRecord>,
}
