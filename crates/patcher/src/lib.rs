//! Binary patch application and signature verification.
//!
//! Both operations delegate to the external patch tool and fold its
//! line-oriented status output into a single outcome. The tool is trusted
//! to be atomic per its own contract: if it fails before signalling
//! success, the installed tree is assumed to still be in its pre-patch
//! state. This crate does not snapshot or roll back.

mod protocol;

pub use protocol::{StatusEvent, TerminalStatus, parse_status_line};

use std::path::{Path, PathBuf};

use kobuk_process::{ProcessError, ProcessRunner, RunOutput};

/// Errors from driving the patch tool.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("patch tool reported failure: {0}")]
    ApplyFailed(String),
}

/// Patch application lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    Idle,
    Verifying,
    Patching,
    Done,
    Failed,
}

/// Outcome of signature verification.
///
/// A mismatch means the installed tree is not at the version the patch
/// assumes as its source; it is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Match,
    Mismatch,
}

/// Drives the external patch tool through verify and apply.
pub struct Patcher {
    tool: PathBuf,
    state: ApplyState,
}

impl Patcher {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            state: ApplyState::Idle,
        }
    }

    pub fn state(&self) -> ApplyState {
        self.state
    }

    /// Asks the tool to compare the installed tree's content signature
    /// against `remote`.
    ///
    /// On a match the patcher stays in `Verifying`, ready for
    /// [`apply`](Patcher::apply).
    pub async fn verify(
        &mut self,
        runner: &dyn ProcessRunner,
        signature: &str,
        install_dir: &Path,
        remote: &str,
    ) -> Result<VerifyOutcome, PatchError> {
        self.state = ApplyState::Verifying;
        let args = vec![
            "verify".to_owned(),
            signature.to_owned(),
            install_dir.display().to_string(),
            remote.to_owned(),
        ];

        tracing::info!(install_dir = %install_dir.display(), remote, "verifying installed tree");
        let output = runner.run(&self.tool, &args).await?;

        match conclude(&output) {
            Conclusion::Success => Ok(VerifyOutcome::Match),
            Conclusion::Failure(reason) => {
                self.state = ApplyState::Failed;
                tracing::warn!(reason, "installed tree signature mismatch");
                Ok(VerifyOutcome::Mismatch)
            }
        }
    }

    /// Downloads and applies the patch in one tool invocation.
    ///
    /// `download_size` is the patch payload size, logged for diagnosis; the
    /// staging space requirement was already checked by the caller.
    pub async fn apply(
        &mut self,
        runner: &dyn ProcessRunner,
        url: &str,
        staging_dir: &Path,
        patch_file: &str,
        install_dir: &Path,
        download_size: u64,
    ) -> Result<(), PatchError> {
        self.state = ApplyState::Patching;
        let args = vec![
            "patch".to_owned(),
            url.to_owned(),
            staging_dir.display().to_string(),
            patch_file.to_owned(),
            install_dir.display().to_string(),
        ];

        tracing::info!(url, patch_file, download_size, "applying patch");
        let output = runner.run(&self.tool, &args).await?;

        match conclude(&output) {
            Conclusion::Success => {
                self.state = ApplyState::Done;
                tracing::info!(patch_file, "patch applied");
                Ok(())
            }
            Conclusion::Failure(reason) => {
                self.state = ApplyState::Failed;
                Err(PatchError::ApplyFailed(reason))
            }
        }
    }
}

enum Conclusion {
    Success,
    Failure(String),
}

/// Folds a tool transcript into its terminal outcome.
///
/// Warnings are logged and skipped, unrecognized lines are noise. A
/// transcript without a terminal marker falls back to the exit code.
fn conclude(output: &RunOutput) -> Conclusion {
    let mut terminal = None;
    for line in &output.stdout {
        match parse_status_line(line) {
            StatusEvent::Progress(_) | StatusEvent::Unrecognized => {}
            StatusEvent::Warning(message) => {
                tracing::warn!(%message, "patch tool warning");
            }
            StatusEvent::Terminal { status, message } => terminal = Some((status, message)),
        }
    }

    match terminal {
        Some((TerminalStatus::Success, _)) if output.success() => Conclusion::Success,
        Some((TerminalStatus::Success, _)) => Conclusion::Failure(format!(
            "tool signalled success but exited with code {}",
            output.exit_code
        )),
        Some((TerminalStatus::Failure, message)) => Conclusion::Failure(
            message.unwrap_or_else(|| "tool reported failure".to_owned()),
        ),
        None if output.success() => Conclusion::Success,
        None => Conclusion::Failure(format!("tool exited with code {}", output.exit_code)),
    }
}
