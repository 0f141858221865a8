//! External tool invocation seam.
//!
//! The download manager and the patch tool are separate binaries the engine
//! spawns and waits on. [`ProcessRunner`] abstracts the spawn so the crates
//! driving those tools can be tested against canned transcripts instead of
//! real binaries.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

/// Errors from spawning or waiting on an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of one tool invocation.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Tool exit code; `-1` when the process was killed by a signal.
    pub exit_code: i32,
    /// Captured stdout, split into lines.
    pub stdout: Vec<String>,
}

impl RunOutput {
    /// True when the tool exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Spawns an external tool and waits for it to exit.
///
/// Implementations must not inherit stdin and must capture stdout in full;
/// callers parse it only after the tool is done.
pub trait ProcessRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        program: &'a Path,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<RunOutput, ProcessError>> + Send + 'a>>;
}

/// Runner backed by `tokio::process`.
pub struct TokioRunner;

impl ProcessRunner for TokioRunner {
    fn run<'a>(
        &'a self,
        program: &'a Path,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<RunOutput, ProcessError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::debug!(program = %program.display(), ?args, "spawning tool");

            let output = tokio::process::Command::new(program)
                .args(args)
                .stdin(std::process::Stdio::null())
                .output()
                .await
                .map_err(|source| ProcessError::Spawn {
                    program: program.display().to_string(),
                    source,
                })?;

            if !output.stderr.is_empty() {
                tracing::debug!(
                    program = %program.display(),
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "tool stderr"
                );
            }

            let exit_code = output.status.code().unwrap_or(-1);
            let stdout = String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::to_owned)
                .collect();

            Ok(RunOutput { exit_code, stdout })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn success_matches_exit_code() {
        let ok = RunOutput {
            exit_code: 0,
            stdout: vec![],
        };
        let failed = RunOutput {
            exit_code: 2,
            stdout: vec![],
        };
        assert!(ok.success());
        assert!(!failed.success());
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let runner = TokioRunner;
        let result = runner
            .run(Path::new("/nonexistent/kobuk-test-tool"), &[])
            .await;
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_lines() {
        let runner = TokioRunner;
        let args = vec!["line one\nline two".to_owned()];
        let output = runner
            .run(&PathBuf::from("/bin/echo"), &args)
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, vec!["line one", "line two"]);
    }
}
