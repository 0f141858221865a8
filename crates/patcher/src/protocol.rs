//! Line-oriented status protocol spoken by the patch tool.
//!
//! The tool emits one small JSON object per stdout line, tagged by `type`.
//! Anything the parser does not recognize is forward-compatible noise from
//! a newer tool build, not an error.

use serde::Deserialize;

/// Terminal outcome reported by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Success,
    Failure,
}

/// One parsed status line.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// Completion fraction in `[0, 1]`.
    Progress(f64),
    /// Non-fatal diagnostic from the tool.
    Warning(String),
    /// Final success or failure marker.
    Terminal {
        status: TerminalStatus,
        message: Option<String>,
    },
    /// Unknown line; skipped.
    Unrecognized,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawLine {
    Progress {
        #[serde(default)]
        value: f64,
    },
    Warning {
        #[serde(default)]
        message: String,
    },
    Done,
    Error {
        #[serde(default)]
        message: String,
    },
}

/// Parses one stdout line from the patch tool.
pub fn parse_status_line(line: &str) -> StatusEvent {
    match serde_json::from_str::<RawLine>(line.trim()) {
        Ok(RawLine::Progress { value }) => StatusEvent::Progress(value),
        Ok(RawLine::Warning { message }) => StatusEvent::Warning(message),
        Ok(RawLine::Done) => StatusEvent::Terminal {
            status: TerminalStatus::Success,
            message: None,
        },
        Ok(RawLine::Error { message }) => StatusEvent::Terminal {
            status: TerminalStatus::Failure,
            message: Some(message),
        },
        Err(_) => StatusEvent::Unrecognized,
    }
}
