//! Top-level update state machine.
//!
//! Stages run strictly in sequence; each external tool invocation is
//! awaited to completion before the next stage starts. Any stage failure
//! halts the cycle and surfaces a single terminal code.

use std::path::Path;

use kobuk_downloader::Downloader;
use kobuk_file_ops::{
    FileOpsError, SpaceCategory, SpaceChecker, SymlinkManager, clear_directory, extract_archive,
};
use kobuk_manifest::{ManifestStore, PatchRecord, VersionRecord};
use kobuk_patcher::{Patcher, VerifyOutcome};
use kobuk_process::ProcessRunner;

use crate::{InstallPaths, UpdateError};

/// Stages of one update cycle, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    SpaceChecking,
    Fetching,
    Applying,
    Symlinking,
}

/// The locally installed build, if any.
#[derive(Debug, Clone)]
pub struct InstalledBuild {
    pub version: String,
    /// Content signature recorded when this build was installed; patches
    /// are only applicable against the build they were computed from.
    pub signature: String,
}

/// Successful terminus of one update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Tree populated from a full archive.
    Installed,
    /// Existing tree patched in place.
    Patched,
    /// Installed build already matches the target; nothing was touched.
    UpToDate,
}

impl UpdateOutcome {
    /// Terminal code for a completed cycle.
    pub fn code(self) -> i32 {
        0
    }
}

/// Sequences one update cycle against a single install tree.
///
/// Exactly one updater may run against an install directory at a time;
/// single-instance discipline (lock file or equivalent) is the embedding
/// client's responsibility.
pub struct Updater<'a, M> {
    manifest: M,
    runner: &'a dyn ProcessRunner,
    paths: InstallPaths,
    space: SpaceChecker,
    links: SymlinkManager,
}

impl<'a, M: ManifestStore> Updater<'a, M> {
    pub fn new(manifest: M, runner: &'a dyn ProcessRunner, paths: InstallPaths) -> Self {
        let space = SpaceChecker::new(paths.staging_dir(), paths.install_dir());
        let links = SymlinkManager::new(paths.install_dir());
        Self {
            manifest,
            runner,
            paths,
            space,
            links,
        }
    }

    /// Runs one full cycle toward `target`, or the manifest's designated
    /// latest build when `target` is `None`.
    ///
    /// The patch path is taken only when an installed build exists, the
    /// manifest carries a patch toward the target, and the patch tool
    /// verifies the installed tree; any other combination takes the
    /// full-install path. There is no automatic retry: callers rerun the
    /// whole cycle.
    pub async fn update(
        &self,
        installed: Option<&InstalledBuild>,
        target: Option<&str>,
    ) -> Result<UpdateOutcome, UpdateError> {
        self.enter(Stage::Resolving);
        let record = self.resolve(target)?;

        if let Some(build) = installed {
            if build.version == record.version {
                tracing::info!(version = %record.version, "already at target version");
                return Ok(UpdateOutcome::UpToDate);
            }
        }

        if let Some(build) = installed {
            if let Some(patch) = self.manifest.patch(&record.version) {
                return self.try_patch(build, &record, &patch).await;
            }
            tracing::info!(target = %record.version, "no patch toward target, full install");
        }
        self.install(&record).await
    }

    /// Full-install path: download the complete archive, clear the install
    /// tree, extract, finalize aliases.
    pub async fn install(&self, record: &VersionRecord) -> Result<UpdateOutcome, UpdateError> {
        self.enter(Stage::SpaceChecking);
        self.ensure_space(record.download_size, SpaceCategory::Temporary)?;
        self.ensure_space(record.extract_size, SpaceCategory::Permanent)?;

        self.enter(Stage::Fetching);
        let downloader = Downloader::new(self.paths.download_tool(), self.paths.staging_dir());
        let archive = match downloader
            .download(self.runner, &record.download_url, record.download_size)
            .await
        {
            Ok(path) => path,
            Err(err) => {
                // A failed transfer can leave a partial file in staging.
                if let Ok(partial) = downloader.artifact_path(&record.download_url) {
                    discard_artifact(&partial);
                }
                return Err(UpdateError::Download(err));
            }
        };

        self.enter(Stage::Applying);
        let prepared = if self.paths.install_dir().exists() {
            clear_directory(self.paths.install_dir()).map(|_| ())
        } else {
            std::fs::create_dir_all(self.paths.install_dir()).map_err(FileOpsError::Io)
        };
        if let Err(err) = prepared {
            discard_artifact(&archive);
            return Err(UpdateError::Extract(err));
        }

        let extracted = extract_archive(&archive, self.paths.install_dir(), record.extract_size);
        // The staged archive is garbage whether extraction worked or not.
        discard_artifact(&archive);
        extracted.map_err(UpdateError::Extract)?;

        self.finalize_links()?;
        Ok(UpdateOutcome::Installed)
    }

    /// Patch candidacy: space first, so the verify subprocess only runs
    /// once the cycle is known to fit; then verify, then apply. A verify
    /// mismatch falls back to the full-install path.
    async fn try_patch(
        &self,
        build: &InstalledBuild,
        record: &VersionRecord,
        patch: &PatchRecord,
    ) -> Result<UpdateOutcome, UpdateError> {
        self.enter(Stage::SpaceChecking);
        self.ensure_space(patch.temp_required, SpaceCategory::Temporary)?;

        std::fs::create_dir_all(self.paths.staging_dir())
            .map_err(|e| UpdateError::Staging(FileOpsError::Io(e)))?;

        let mut patcher = Patcher::new(self.paths.patch_tool());
        let outcome = patcher
            .verify(
                self.runner,
                &build.signature,
                self.paths.install_dir(),
                &record.heal_url,
            )
            .await
            .map_err(UpdateError::PatchVerify)?;

        match outcome {
            VerifyOutcome::Match => {
                self.enter(Stage::Applying);
                patcher
                    .apply(
                        self.runner,
                        &patch.url,
                        self.paths.staging_dir(),
                        &patch.file_name,
                        self.paths.install_dir(),
                        patch.temp_required,
                    )
                    .await
                    .map_err(UpdateError::PatchApply)?;

                self.finalize_links()?;
                Ok(UpdateOutcome::Patched)
            }
            VerifyOutcome::Mismatch => {
                tracing::warn!(
                    installed = %build.version,
                    "installed tree does not match its recorded build, falling back to full install"
                );
                self.install(record).await
            }
        }
    }

    fn resolve(&self, target: Option<&str>) -> Result<VersionRecord, UpdateError> {
        match target {
            Some(label) => self
                .manifest
                .version(label)
                .ok_or_else(|| UpdateError::UnknownVersion(label.to_owned())),
            None => self
                .manifest
                .latest()
                .ok_or_else(|| UpdateError::UnknownVersion("latest".to_owned())),
        }
    }

    fn ensure_space(&self, required: u64, category: SpaceCategory) -> Result<(), UpdateError> {
        let verdict = self
            .space
            .check(required, category)
            .map_err(UpdateError::SpaceQuery)?;
        if verdict.is_sufficient() {
            Ok(())
        } else {
            tracing::error!(required, ?category, "not enough free space");
            Err(UpdateError::InsufficientSpace { required, category })
        }
    }

    fn finalize_links(&self) -> Result<(), UpdateError> {
        self.enter(Stage::Symlinking);
        self.links.prepare().map_err(UpdateError::Symlink)?;
        let created = self.links.commit().map_err(UpdateError::Symlink)?;
        tracing::info!(created, "symlink aliases in place");
        Ok(())
    }

    fn enter(&self, stage: Stage) {
        tracing::info!(?stage, "update stage");
    }
}

/// Best-effort removal of a staged artifact.
fn discard_artifact(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove staged artifact");
        }
    }
}
