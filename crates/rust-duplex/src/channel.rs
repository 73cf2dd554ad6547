//! Byte channel abstraction.
//!
//! The engine never opens or configures the physical link. It needs four
//! operations from it: how many bytes are ready, read one, write a command
//! line, and flush. Anything implementing [`Channel`] can be driven by a
//! [`Duplex`](crate::Duplex).

#[cfg(feature = "serial")]
pub mod serial;

use std::io;

#[cfg(feature = "serial")]
pub use serial::SerialChannel;

/// A byte-oriented, line-terminated communication channel.
pub trait Channel {
    /// Number of bytes that can be read without blocking.
    fn available(&mut self) -> io::Result<usize>;

    /// Read one byte. Only called after [`available`](Self::available)
    /// reported at least one byte.
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Write `line` followed by the channel's line terminator.
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush buffered output to the peripheral.
    fn flush(&mut self) -> io::Result<()>;
}

impl<T: Channel + ?Sized> Channel for Box<T> {
    fn available(&mut self) -> io::Result<usize> {
        (**self).available()
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        (**self).read_byte()
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<T: Channel + ?Sized> Channel for &mut T {
    fn available(&mut self) -> io::Result<usize> {
        (**self).available()
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        (**self).read_byte()
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
