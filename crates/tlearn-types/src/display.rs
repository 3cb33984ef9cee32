//! Display lines produced by the shell.
//!
//! The rendering surface consumes an ordered, append-only list of
//! [`DisplayLine`]s. Each line is tagged with a [`LineKind`] so the renderer
//! can style it; the shell itself never decides colors or layout.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic kind of a display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Echo of the raw line the user submitted.
    Command,
    /// Plain command output.
    Output,
    Error,
    Info,
    Success,
}

impl LineKind {
    /// Lower-case name, as used by the front-end styles.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Output => "output",
            Self::Error => "error",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered unit of terminal output. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLine {
    /// Unique within a session.
    pub id: u64,
    pub kind: LineKind,
    pub content: String,
}

impl DisplayLine {
    pub fn new(id: u64, kind: LineKind, content: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
        }
    }
}
