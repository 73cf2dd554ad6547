//! Error types for rust-duplex.
//!
//! Queue and registration failures are synchronous return values. A command
//! that times out is never an engine error: it is resolved through its own
//! failure callbacks.

use thiserror::Error;

/// Maximum length of field content to echo back in error messages.
const MAX_FIELD_DISPLAY: usize = 48;

/// Shorten a rejected field for display.
fn format_field_snippet(value: &str) -> String {
    if value.len() <= MAX_FIELD_DISPLAY {
        return value.to_string();
    }
    let mut end = MAX_FIELD_DISPLAY;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &value[..end], value.len())
}

/// Which bounded text field of a command or hook was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The command line transmitted to the peripheral.
    Command,
    /// The pattern the response is matched against.
    Expectation,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Expectation => write!(f, "expectation"),
        }
    }
}

/// The main error type for rust-duplex operations.
#[derive(Debug, Error)]
pub enum DuplexError {
    /// The command queue is at capacity.
    #[error("command queue is full (capacity {capacity})")]
    QueueFull {
        /// The queue capacity.
        capacity: usize,
    },

    /// A command or expectation exceeds its length bound.
    #[error("{field} is {len} bytes, maximum is {max}: '{}'", format_field_snippet(value))]
    OversizedField {
        /// The field that was rejected.
        field: Field,
        /// Length of the rejected value in bytes.
        len: usize,
        /// The configured bound.
        max: usize,
        /// The rejected value.
        value: String,
    },

    /// A chain needs at least two commands.
    #[error("a chain needs at least 2 commands, got {len}")]
    ChainTooShort {
        /// Number of commands supplied.
        len: usize,
    },

    /// The hook registry is at capacity.
    #[error("hook registry is full (capacity {capacity})")]
    HookRegistryFull {
        /// The registry capacity.
        capacity: usize,
    },

    /// A pattern could not be compiled by the matcher.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Description of what's wrong with the pattern.
        message: String,
    },

    /// An I/O error occurred on the channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Result type alias for rust-duplex operations.
pub type Result<T> = std::result::Result<T, DuplexError>;

impl DuplexError {
    /// Create a queue full error.
    #[must_use]
    pub const fn queue_full(capacity: usize) -> Self {
        Self::QueueFull { capacity }
    }

    /// Create an oversized field error.
    pub fn oversized(field: Field, value: impl Into<String>, max: usize) -> Self {
        let value = value.into();
        Self::OversizedField {
            field,
            len: value.len(),
            max,
            value,
        }
    }

    /// Create a chain too short error.
    #[must_use]
    pub const fn chain_too_short(len: usize) -> Self {
        Self::ChainTooShort { len }
    }

    /// Create a hook registry full error.
    #[must_use]
    pub const fn hook_registry_full(capacity: usize) -> Self {
        Self::HookRegistryFull { capacity }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Wrap an I/O result with context.
    pub fn with_io_context<T>(result: std::io::Result<T>, context: impl Into<String>) -> Result<T> {
        result.map_err(|e| Self::io_context(context, e))
    }

    /// Check if this is a queue full error.
    #[must_use]
    pub const fn is_queue_full(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }

    /// Check if this is an oversized field error.
    #[must_use]
    pub const fn is_oversized(&self) -> bool {
        matches!(self, Self::OversizedField { .. })
    }

    /// Check if this is a chain too short error.
    #[must_use]
    pub const fn is_chain_too_short(&self) -> bool {
        matches!(self, Self::ChainTooShort { .. })
    }

    /// Check if this error came from the channel.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_) | Self::IoWithContext { .. })
    }
}
