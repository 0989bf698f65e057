//! The problem model shared by every source and sink.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Severity level for problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - must be fixed.
    #[default]
    Error,
    /// Warning - should be reviewed.
    Warning,
    /// Info - informational message.
    Info,
}

/// A location inside a reported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// A problem read from a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Problem {
    /// Path of the file, absolute or relative to the working directory.
    pub filename: String,

    /// Severity level.
    pub severity: Severity,

    /// Optional error code, usually the name of a lint rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Where the problem starts.
    pub start: Position,

    /// Where the problem ends.
    pub end: Position,

    /// The message to display.
    pub message: String,
}

impl Problem {
    /// Creates an error-level problem spanning a single position.
    pub fn new(filename: impl Into<String>, message: impl Into<String>, at: Position) -> Self {
        Self {
            filename: filename.into(),
            severity: Severity::Error,
            code: None,
            start: at,
            end: at,
            message: message.into(),
        }
    }

    /// Sets the severity level.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the end position.
    pub fn with_end(mut self, end: Position) -> Self {
        self.end = end;
        self
    }
}

/// A problem that can no longer be modified.
///
/// Sinks only ever see `&Problem` borrowed out of this shared pointer.
pub type FrozenProblem = Arc<Problem>;

/// Freezes a problem. Freezing an already frozen problem returns it unchanged.
pub fn freeze(problem: impl Into<FrozenProblem>) -> FrozenProblem {
    problem.into()
}
