//! [`Channel`] over a serial port.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use super::Channel;
use crate::config::DuplexConfig;
use crate::error::{DuplexError, Result};
use crate::types::LineEnding;

/// Default baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Options for opening a serial port.
#[derive(Debug, Clone)]
pub struct SerialOptions {
    /// Baud rate.
    pub baud_rate: u32,
    /// Read/write timeout of the underlying port.
    pub timeout: Duration,
    /// Line ending appended by [`Channel::write_line`].
    pub line_ending: LineEnding,
}

impl Default for SerialOptions {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(50),
            line_ending: LineEnding::CrLf,
        }
    }
}

impl SerialOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options using the line ending of `config`.
    #[must_use]
    pub fn from_config(config: &DuplexConfig) -> Self {
        Self::default().line_ending(config.line_ending)
    }

    /// Set the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the port timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the line ending.
    #[must_use]
    pub const fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Open the port at `path`.
    pub fn open(&self, path: &str) -> Result<SerialChannel> {
        let port = serialport::new(path, self.baud_rate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| DuplexError::io_context(format!("opening {path}"), e.into()))?;
        tracing::debug!(path, baud = self.baud_rate, "Serial port opened");
        Ok(SerialChannel::new(port, self.line_ending))
    }
}

/// A channel backed by a `serialport` port.
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
    line_ending: LineEnding,
}

impl SerialChannel {
    /// Wrap an already opened port.
    #[must_use]
    pub fn new(port: Box<dyn SerialPort>, line_ending: LineEnding) -> Self {
        Self { port, line_ending }
    }

    /// Open `path` with default options.
    pub fn open(path: &str) -> Result<Self> {
        SerialOptions::default().open(path)
    }

    /// Get the underlying port.
    #[must_use]
    pub fn port(&self) -> &dyn SerialPort {
        self.port.as_ref()
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("port", &self.port.name())
            .field("line_ending", &self.line_ending)
            .finish()
    }
}

impl Channel for SerialChannel {
    fn available(&mut self) -> io::Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(self.line_ending.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}
