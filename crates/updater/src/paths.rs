//! Filesystem layout the engine operates in.

use std::path::{Path, PathBuf};

#[cfg(not(windows))]
const DOWNLOAD_TOOL: &str = "aria2c";
#[cfg(windows)]
const DOWNLOAD_TOOL: &str = "aria2c.exe";

#[cfg(not(windows))]
const PATCH_TOOL: &str = "butler";
#[cfg(windows)]
const PATCH_TOOL: &str = "butler.exe";

/// Install root, staging directory and external tool locations.
///
/// Resolved once at construction and never mutated; both the staging and
/// install directories are exclusively owned by the single in-flight update
/// cycle.
#[derive(Debug, Clone)]
pub struct InstallPaths {
    install_dir: PathBuf,
    staging_dir: PathBuf,
    download_tool: PathBuf,
    patch_tool: PathBuf,
}

impl InstallPaths {
    /// Lays out staging and tool locations under the client data directory.
    pub fn new(install_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            install_dir: install_dir.into(),
            staging_dir: data_dir.join("staging"),
            download_tool: data_dir.join("bin").join(DOWNLOAD_TOOL),
            patch_tool: data_dir.join("bin").join(PATCH_TOOL),
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn download_tool(&self) -> &Path {
        &self.download_tool
    }

    pub fn patch_tool(&self) -> &Path {
        &self.patch_tool
    }
}
