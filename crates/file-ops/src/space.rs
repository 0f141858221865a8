//! Free-space pre-checks for staging and install volumes.

use std::path::{Path, PathBuf};

use crate::FileOpsError;

/// Which filesystem root a space requirement applies against.
///
/// The staging and install directories may live on different volumes with
/// different free space, so every requirement names its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceCategory {
    /// Staging/scratch directory for downloaded artifacts.
    Temporary,
    /// Final install directory.
    Permanent,
}

/// Outcome of a free-space comparison.
///
/// Running out of space is a common, expected verdict; it is never
/// reported as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceVerdict {
    Sufficient,
    Insufficient,
}

impl SpaceVerdict {
    pub fn is_sufficient(self) -> bool {
        matches!(self, SpaceVerdict::Sufficient)
    }
}

/// Compares byte requirements against available space per category root.
///
/// Callers are responsible for summing worst-case requirements per
/// category; this only answers "does `required` fit on that volume".
#[derive(Debug, Clone)]
pub struct SpaceChecker {
    temp_root: PathBuf,
    install_root: PathBuf,
}

impl SpaceChecker {
    pub fn new(temp_root: impl Into<PathBuf>, install_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: temp_root.into(),
            install_root: install_root.into(),
        }
    }

    fn root(&self, category: SpaceCategory) -> &Path {
        match category {
            SpaceCategory::Temporary => &self.temp_root,
            SpaceCategory::Permanent => &self.install_root,
        }
    }

    /// Checks whether `required` bytes fit on the category's volume.
    ///
    /// A root that does not exist yet is probed through its nearest
    /// existing ancestor, since that is the volume it will be created on.
    /// `Err` is reserved for the query itself failing; an insufficient
    /// volume is an `Ok` verdict.
    pub fn check(
        &self,
        required: u64,
        category: SpaceCategory,
    ) -> Result<SpaceVerdict, FileOpsError> {
        let root = self.root(category);
        let available = fs2::available_space(nearest_existing(root))?;
        let result = verdict(available, required);
        tracing::debug!(
            root = %root.display(),
            required,
            available,
            ?result,
            "free space check"
        );
        Ok(result)
    }
}

/// The deepest existing ancestor of `path`, which determines the volume
/// `path` will land on once created.
fn nearest_existing(path: &Path) -> &Path {
    let mut current = path;
    while !current.exists() {
        match current.parent() {
            Some(parent) => current = parent,
            None => return path,
        }
    }
    current
}

/// Exactly-equal free bytes count as sufficient.
fn verdict(available: u64, required: u64) -> SpaceVerdict {
    if available >= required {
        SpaceVerdict::Sufficient
    } else {
        SpaceVerdict::Insufficient
    }
}
