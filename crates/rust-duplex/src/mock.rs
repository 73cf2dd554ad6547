//! Scripted in-memory channel for tests.
//!
//! A [`MockChannel`] stands in for a peripheral. Tests queue the bytes the
//! peripheral "sends" and inspect the lines the engine wrote. Clones share
//! state, so a test keeps one handle while the engine owns another.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::channel::Channel;
use crate::config::DuplexConfig;
use crate::types::LineEnding;

/// Shared state for the mock channel.
#[derive(Debug, Default)]
struct MockState {
    /// Bytes waiting to be read by the engine.
    input: VecDeque<u8>,
    /// Bytes written by the engine and not yet taken.
    output: Vec<u8>,
    /// Every line written, without terminators.
    lines: Vec<String>,
    line_ending: LineEnding,
    flushes: usize,
    /// Error to return on the next read.
    read_error: Option<String>,
    /// Error to return on the next write.
    write_error: Option<String>,
    /// Error to return on the next flush.
    flush_error: Option<String>,
}

/// In-memory [`Channel`] with scripted input.
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    /// Create a channel terminating lines with CRLF.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel with a specific line terminator.
    #[must_use]
    pub fn with_line_ending(line_ending: LineEnding) -> Self {
        let channel = Self::new();
        channel.lock().line_ending = line_ending;
        channel
    }

    /// Create a channel using the line ending of `config`.
    #[must_use]
    pub fn from_config(config: &DuplexConfig) -> Self {
        Self::with_line_ending(config.line_ending)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue bytes for the engine to read.
    pub fn queue_input(&self, data: &[u8]) {
        self.lock().input.extend(data);
    }

    /// Queue a string for the engine to read.
    pub fn queue_input_str(&self, s: &str) {
        self.queue_input(s.as_bytes());
    }

    /// Number of queued bytes not yet read.
    #[must_use]
    pub fn pending_input(&self) -> usize {
        self.lock().input.len()
    }

    /// Take everything the engine has written so far.
    #[must_use]
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.lock().output)
    }

    /// Take written output as a string.
    #[must_use]
    pub fn take_output_str(&self) -> String {
        String::from_utf8_lossy(&self.take_output()).into_owned()
    }

    /// Every command line written since creation.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    /// Number of flushes.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }

    /// Fail the next read with `msg`.
    pub fn fail_next_read(&self, msg: impl Into<String>) {
        self.lock().read_error = Some(msg.into());
    }

    /// Fail the next write with `msg`.
    pub fn fail_next_write(&self, msg: impl Into<String>) {
        self.lock().write_error = Some(msg.into());
    }

    /// Fail the next flush with `msg`.
    pub fn fail_next_flush(&self, msg: impl Into<String>) {
        self.lock().flush_error = Some(msg.into());
    }
}

impl Channel for MockChannel {
    fn available(&mut self) -> io::Result<usize> {
        Ok(self.lock().input.len())
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut state = self.lock();
        if let Some(msg) = state.read_error.take() {
            return Err(io::Error::other(msg));
        }
        state
            .input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no input queued"))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut state = self.lock();
        if let Some(msg) = state.write_error.take() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, msg));
        }
        let ending = state.line_ending;
        state.output.extend_from_slice(line.as_bytes());
        state.output.extend_from_slice(ending.as_bytes());
        state.lines.push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.lock();
        if let Some(msg) = state.flush_error.take() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, msg));
        }
        state.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let mock = MockChannel::new();
        let mut engine_side = mock.clone();
        mock.queue_input_str("OK");
        assert_eq!(engine_side.available().unwrap(), 2);
        assert_eq!(engine_side.read_byte().unwrap(), b'O');
        assert_eq!(mock.pending_input(), 1);
    }

    #[test]
    fn write_line_appends_terminator() {
        let mock = MockChannel::with_line_ending(LineEnding::Lf);
        let mut engine_side = mock.clone();
        engine_side.write_line("ATZ").unwrap();
        engine_side.flush().unwrap();
        assert_eq!(mock.take_output_str(), "ATZ\n");
        assert!(mock.take_output().is_empty());
        assert_eq!(mock.lines(), ["ATZ"]);
        assert_eq!(mock.flush_count(), 1);
    }

    #[test]
    fn line_ending_from_config() {
        let config = DuplexConfig::new().line_ending(LineEnding::Cr);
        let mock = MockChannel::from_config(&config);
        let mut engine_side = mock.clone();
        engine_side.write_line("AT").unwrap();
        assert_eq!(mock.take_output_str(), "AT\r");
    }

    #[test]
    fn injected_errors_fire_once() {
        let mock = MockChannel::new();
        let mut engine_side = mock.clone();
        mock.queue_input_str("A");
        mock.fail_next_read("line noise");
        assert!(engine_side.read_byte().is_err());
        assert_eq!(engine_side.read_byte().unwrap(), b'A');

        mock.fail_next_write("unplugged");
        let err = engine_side.write_line("AT").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        engine_side.write_line("AT").unwrap();

        mock.fail_next_flush("stalled");
        let err = engine_side.flush().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        engine_side.flush().unwrap();
        assert_eq!(mock.flush_count(), 1);
    }
}
