//! Post-install symlink aliases the game runtime expects.

use std::path::{Path, PathBuf};

use crate::FileOpsError;

/// Aliases required after install: the dedicated-server loader opens the
/// shared library under a different file name than the one shipped.
pub const DEFAULT_LINKS: &[(&str, &str)] = &[("bin/server.so", "bin/server_srv.so")];

/// Creates the alias table under an install root.
///
/// Two-phase: [`prepare`](SymlinkManager::prepare) proves every source
/// exists before finalization, [`commit`](SymlinkManager::commit) creates
/// the aliases. Commit is idempotent and safe to rerun.
#[derive(Debug, Clone)]
pub struct SymlinkManager {
    install_root: PathBuf,
    links: Vec<(String, String)>,
}

impl SymlinkManager {
    /// Manager over the default alias table.
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self::with_links(install_root, DEFAULT_LINKS)
    }

    /// Manager over a custom `(source, alias)` table, both paths relative
    /// to the install root.
    pub fn with_links(install_root: impl Into<PathBuf>, links: &[(&str, &str)]) -> Self {
        Self {
            install_root: install_root.into(),
            links: links
                .iter()
                .map(|(s, a)| ((*s).to_owned(), (*a).to_owned()))
                .collect(),
        }
    }

    /// Checks every alias source exists, creating nothing.
    ///
    /// Run before permanent-install finalization so a broken tree is caught
    /// while the failure is still reportable as an install problem.
    pub fn prepare(&self) -> Result<(), FileOpsError> {
        for (source, _) in &self.links {
            let path = self.install_root.join(source);
            if !path.exists() {
                return Err(FileOpsError::MissingLinkSource(path));
            }
        }
        Ok(())
    }

    /// Creates each alias, replacing a pre-existing one of the same name.
    ///
    /// Returns the number of aliases created. Aliases created before a
    /// failure stay in place; rerunning commit converges to the same set.
    pub fn commit(&self) -> Result<usize, FileOpsError> {
        let mut created = 0usize;
        for (source, alias) in &self.links {
            let source_path = self.install_root.join(source);
            let alias_path = self.install_root.join(alias);

            // A symlink to a missing source would dangle silently.
            if !source_path.exists() {
                return Err(FileOpsError::MissingLinkSource(source_path));
            }
            if alias_path.symlink_metadata().is_ok() {
                std::fs::remove_file(&alias_path)?;
            }
            make_link(&source_path, &alias_path)?;
            tracing::debug!(
                source = %source_path.display(),
                alias = %alias_path.display(),
                "created alias"
            );
            created += 1;
        }
        Ok(created)
    }
}

#[cfg(unix)]
fn make_link(source: &Path, alias: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, alias)
}

// No symlink privilege guarantee outside Unix; a copy satisfies the loader.
#[cfg(not(unix))]
fn make_link(source: &Path, alias: &Path) -> std::io::Result<()> {
    std::fs::copy(source, alias).map(|_| ())
}
