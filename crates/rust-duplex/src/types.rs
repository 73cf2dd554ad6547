//! Common types for rust-duplex.
//!
//! This module defines the small value types shared by the queue, the
//! matcher and the engine: insertion discipline, engine state, match
//! results and line conventions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Queue insertion discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    /// Append after the current last entry (FIFO).
    #[default]
    Tail,

    /// Run next: insert ahead of every command that has not started yet.
    Head,
}

/// State of the execution state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineState {
    /// No command in flight.
    #[default]
    Idle,

    /// The head command has been transmitted and its timeout is armed.
    Awaiting,
}

impl EngineState {
    /// Check if a command is in flight.
    #[must_use]
    pub const fn is_awaiting(self) -> bool {
        matches!(self, Self::Awaiting)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Awaiting => write!(f, "awaiting"),
        }
    }
}

/// When the in-flight expectation is tested against received input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// After every accumulated byte.
    #[default]
    EveryByte,

    /// Only after a line terminator (`\n`) has been accumulated.
    LineTerminated,
}

/// Line endings appended to transmitted commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix-style line ending (LF).
    Lf,

    /// Windows / modem style line ending (CRLF).
    #[default]
    CrLf,

    /// Bare carriage return (CR).
    Cr,
}

impl LineEnding {
    /// Get the line ending as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Get the line ending as bytes.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

/// A successful match of a pattern against the input accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Byte offset of the match within the accumulator.
    pub start: usize,

    /// Byte offset one past the end of the match.
    pub end: usize,

    /// The full text that matched.
    pub matched: String,

    /// Capture groups reported by the matcher.
    pub captures: Vec<String>,
}

impl Match {
    /// Create a new match result.
    #[must_use]
    pub fn new(start: usize, end: usize, matched: impl Into<String>) -> Self {
        Self {
            start,
            end,
            matched: matched.into(),
            captures: Vec::new(),
        }
    }

    /// Create a match with captures.
    #[must_use]
    pub fn with_captures(mut self, captures: Vec<String>) -> Self {
        self.captures = captures;
        self
    }

    /// Length of the match in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the match is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of accumulator bytes a consuming match removes.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.end
    }

    /// Get a capture group by index.
    #[must_use]
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).map(String::as_str)
    }

    /// Get the full matched text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.matched
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_offsets() {
        let m = Match::new(2, 8, "OK[10]").with_captures(vec!["10".into()]);
        assert_eq!(m.len(), 6);
        assert_eq!(m.consumed(), 8);
        assert_eq!(m.capture(0), Some("10"));
        assert_eq!(m.capture(1), None);
        assert_eq!(m.to_string(), "OK[10]");
    }

    #[test]
    fn line_ending_bytes() {
        assert_eq!(LineEnding::CrLf.as_bytes(), b"\r\n");
        assert_eq!(LineEnding::Lf.as_str(), "\n");
        assert_eq!(LineEnding::default(), LineEnding::CrLf);
    }

    #[test]
    fn timing_deserializes_lowercase() {
        let t: Timing = serde_json::from_str("\"head\"").unwrap();
        assert_eq!(t, Timing::Head);
    }
}
