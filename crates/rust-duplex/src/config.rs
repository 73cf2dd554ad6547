//! Configuration types for rust-duplex.
//!
//! [`DuplexConfig`] holds every bound and policy of an engine instance.
//! It can be built in code, loaded from a TOML or JSON file ([`file`]) and
//! overridden from the environment ([`env`]).

pub mod env;
pub mod file;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DuplexError, Result};
use crate::types::{LineEnding, MatchMode};

/// Default command queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Default input accumulator capacity in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

/// Default maximum command length in bytes.
pub const DEFAULT_MAX_COMMAND_LEN: usize = 128;

/// Default maximum expectation length in bytes.
pub const DEFAULT_MAX_EXPECTATION_LEN: usize = 128;

/// Default hook registry capacity.
pub const DEFAULT_HOOK_CAPACITY: usize = 8;

/// Default per-command response timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2500);

/// Default sleep between polls in async waits.
pub const DEFAULT_WAIT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for a duplex engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplexConfig {
    /// Maximum number of queued commands.
    pub queue_capacity: usize,

    /// Capacity of the input accumulator in bytes.
    pub buffer_capacity: usize,

    /// Maximum command length in bytes.
    pub max_command_len: usize,

    /// Maximum expectation length in bytes.
    pub max_expectation_len: usize,

    /// Maximum number of registered hooks.
    pub hook_capacity: usize,

    /// Timeout applied to commands built without an explicit one.
    #[serde(rename = "default_timeout_ms", with = "duration_ms")]
    pub default_timeout: Duration,

    /// Line ending for channels built from this configuration.
    ///
    /// The engine never appends terminators itself; the channel does. Only
    /// channels created through `from_config` (`SerialOptions`,
    /// `MockChannel`) pick this up. A channel passed to `begin` keeps the
    /// line ending it was built with.
    pub line_ending: LineEnding,

    /// When the in-flight expectation is tested.
    pub match_mode: MatchMode,

    /// Drop NUL bytes read from the channel.
    pub ignore_nul: bool,

    /// Reset the accumulator immediately before each transmission.
    pub clear_on_send: bool,

    /// Sleep between polls in [`Duplex::wait_async`](crate::Duplex::wait_async).
    #[serde(rename = "wait_poll_interval_ms", with = "duration_ms")]
    pub wait_poll_interval: Duration,
}

impl Default for DuplexConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
            max_expectation_len: DEFAULT_MAX_EXPECTATION_LEN,
            hook_capacity: DEFAULT_HOOK_CAPACITY,
            default_timeout: DEFAULT_TIMEOUT,
            line_ending: LineEnding::default(),
            match_mode: MatchMode::default(),
            ignore_nul: true,
            clear_on_send: false,
            wait_poll_interval: DEFAULT_WAIT_POLL_INTERVAL,
        }
    }
}

impl DuplexConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    ///
    /// Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| DuplexError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| DuplexError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| DuplexError::config(e.to_string()))
    }

    /// Check that every capacity and bound is usable.
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("queue_capacity", self.queue_capacity),
            ("buffer_capacity", self.buffer_capacity),
            ("max_command_len", self.max_command_len),
            ("max_expectation_len", self.max_expectation_len),
        ];
        for (name, value) in bounds {
            if value == 0 {
                return Err(DuplexError::config(format!("{name} must be greater than 0")));
            }
        }
        Ok(())
    }

    /// Set the queue capacity.
    #[must_use]
    pub const fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the accumulator capacity.
    #[must_use]
    pub const fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the maximum command length.
    #[must_use]
    pub const fn max_command_len(mut self, len: usize) -> Self {
        self.max_command_len = len;
        self
    }

    /// Set the maximum expectation length.
    #[must_use]
    pub const fn max_expectation_len(mut self, len: usize) -> Self {
        self.max_expectation_len = len;
        self
    }

    /// Set the hook registry capacity.
    #[must_use]
    pub const fn hook_capacity(mut self, capacity: usize) -> Self {
        self.hook_capacity = capacity;
        self
    }

    /// Set the default command timeout.
    #[must_use]
    pub const fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the line ending.
    #[must_use]
    pub const fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Set the match mode.
    #[must_use]
    pub const fn match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Set whether NUL bytes are dropped.
    #[must_use]
    pub const fn ignore_nul(mut self, ignore: bool) -> Self {
        self.ignore_nul = ignore;
        self
    }

    /// Set whether the accumulator is reset before each transmission.
    #[must_use]
    pub const fn clear_on_send(mut self, clear: bool) -> Self {
        self.clear_on_send = clear;
        self
    }

    /// Set the async wait poll interval.
    #[must_use]
    pub const fn wait_poll_interval(mut self, interval: Duration) -> Self {
        self.wait_poll_interval = interval;
        self
    }
}

/// Serde adapter storing a [`Duration`] as integer milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DuplexConfig::default();
        assert_eq!(config.queue_capacity, 10);
        assert_eq!(config.buffer_capacity, 512);
        assert_eq!(config.default_timeout, Duration::from_millis(2500));
        assert_eq!(config.line_ending, LineEnding::CrLf);
        assert!(config.ignore_nul);
        assert!(!config.clear_on_send);
    }

    #[test]
    fn builder_setters() {
        let config = DuplexConfig::new()
            .queue_capacity(3)
            .buffer_capacity(256)
            .max_command_len(64)
            .default_timeout(Duration::from_millis(500))
            .match_mode(MatchMode::LineTerminated);

        assert_eq!(config.queue_capacity, 3);
        assert_eq!(config.buffer_capacity, 256);
        assert_eq!(config.max_command_len, 64);
        assert_eq!(config.default_timeout, Duration::from_millis(500));
        assert_eq!(config.match_mode, MatchMode::LineTerminated);
    }

    #[test]
    fn toml_partial_keeps_defaults() {
        let config = DuplexConfig::from_toml_str(
            r#"
            queue_capacity = 3
            default_timeout_ms = 100
            line_ending = "lf"
            match_mode = "line_terminated"
            "#,
        )
        .unwrap();
        assert_eq!(config.queue_capacity, 3);
        assert_eq!(config.default_timeout, Duration::from_millis(100));
        assert_eq!(config.line_ending, LineEnding::Lf);
        assert_eq!(config.match_mode, MatchMode::LineTerminated);
        assert_eq!(config.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn toml_round_trip() {
        let config = DuplexConfig::new().hook_capacity(2).clear_on_send(true);
        let text = config.to_toml_string().unwrap();
        assert_eq!(DuplexConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn zero_capacity_rejected() {
        let err = DuplexConfig::new().queue_capacity(0).validate().unwrap_err();
        assert!(err.to_string().contains("queue_capacity"));
    }
}
