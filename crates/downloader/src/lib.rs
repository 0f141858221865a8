//! Large-artifact retrieval through the external download manager.
//!
//! The engine never streams bytes itself: it hands the URL and staging
//! directory to the download tool, waits for it to exit, and then checks
//! that the artifact landed at the advertised size. Retry is a policy
//! decision left to the orchestrator's caller, not built in here.

use std::path::{Path, PathBuf};

use kobuk_process::{ProcessError, ProcessRunner};

/// Errors from one download attempt.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("download tool exited with code {0}")]
    Failed(i32),

    #[error("downloaded {actual} bytes, expected {expected}")]
    Incomplete { expected: u64, actual: u64 },

    #[error("download tool left no artifact at {0}")]
    MissingArtifact(PathBuf),

    #[error("URL has no file name: {0}")]
    BadUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Drives the external download manager for one artifact at a time.
pub struct Downloader {
    tool: PathBuf,
    staging_dir: PathBuf,
    extra_args: Vec<String>,
}

impl Downloader {
    pub fn new(tool: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            staging_dir: staging_dir.into(),
            extra_args: Vec::new(),
        }
    }

    /// Extra tool flags appended to every invocation (connection tuning).
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Where the artifact for `url` lands in staging.
    pub fn artifact_path(&self, url: &str) -> Result<PathBuf, DownloadError> {
        let name = url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| DownloadError::BadUrl(url.to_owned()))?;
        Ok(self.staging_dir.join(name))
    }

    /// Downloads `url` into the staging directory and verifies its size.
    ///
    /// Blocks until the tool exits. On failure a partial file may remain in
    /// staging; whether to delete it is the caller's decision.
    pub async fn download(
        &self,
        runner: &dyn ProcessRunner,
        url: &str,
        expected_size: u64,
    ) -> Result<PathBuf, DownloadError> {
        let dest = self.artifact_path(url)?;
        std::fs::create_dir_all(&self.staging_dir)?;

        let mut args = vec![url.to_owned(), self.staging_dir.display().to_string()];
        args.extend(self.extra_args.iter().cloned());

        tracing::info!(url, dest = %dest.display(), expected_size, "starting download");
        let output = runner.run(&self.tool, &args).await?;

        if !output.success() {
            tracing::error!(url, code = output.exit_code, "download tool failed");
            return Err(DownloadError::Failed(output.exit_code));
        }

        let actual = std::fs::metadata(&dest)
            .map_err(|_| DownloadError::MissingArtifact(dest.clone()))?
            .len();
        if actual != expected_size {
            tracing::error!(url, expected_size, actual, "download size mismatch");
            return Err(DownloadError::Incomplete {
                expected: expected_size,
                actual,
            });
        }

        tracing::info!(url, bytes = actual, "download complete");
        Ok(dest)
    }
}
