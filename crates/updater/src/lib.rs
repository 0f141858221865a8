//! Update orchestration for the game-content deployment client.
//!
//! The orchestrator owns all cross-component sequencing: it resolves the
//! target version from the manifest, decides between an incremental patch
//! and a full install, pre-checks free space, drives the external download
//! and patch tools, and finalizes the symlink aliases. Every stage failure
//! halts the cycle with a single terminal code; callers retry the whole
//! cycle from the top.

mod error;
mod orchestrator;
mod paths;

pub use error::UpdateError;
pub use orchestrator::{InstalledBuild, Stage, UpdateOutcome, Updater};
pub use paths::InstallPaths;
