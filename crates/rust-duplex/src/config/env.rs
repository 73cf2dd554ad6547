//! Environment-based configuration overrides.

use std::collections::HashMap;
use std::time::Duration;

use super::DuplexConfig;
use crate::error::{DuplexError, Result};
use crate::types::{LineEnding, MatchMode};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "DUPLEX";

/// Variable names understood by [`EnvConfig::apply`], without prefix.
pub mod vars {
    /// Queue capacity.
    pub const QUEUE_CAPACITY: &str = "QUEUE_CAPACITY";
    /// Accumulator capacity.
    pub const BUFFER_CAPACITY: &str = "BUFFER_CAPACITY";
    /// Maximum command length.
    pub const MAX_COMMAND_LEN: &str = "MAX_COMMAND_LEN";
    /// Maximum expectation length.
    pub const MAX_EXPECTATION_LEN: &str = "MAX_EXPECTATION_LEN";
    /// Hook registry capacity.
    pub const HOOK_CAPACITY: &str = "HOOK_CAPACITY";
    /// Default command timeout in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: &str = "DEFAULT_TIMEOUT_MS";
    /// `lf`, `crlf` or `cr`.
    pub const LINE_ENDING: &str = "LINE_ENDING";
    /// `every_byte` or `line_terminated`.
    pub const MATCH_MODE: &str = "MATCH_MODE";
    /// Drop NUL bytes.
    pub const IGNORE_NUL: &str = "IGNORE_NUL";
    /// Reset the accumulator before each transmission.
    pub const CLEAR_ON_SEND: &str = "CLEAR_ON_SEND";
}

/// Environment variable reader.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Fixed values used instead of the process environment.
    source: Option<HashMap<String, String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a new environment config reader.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: None,
        }
    }

    /// Create a reader over a fixed set of variables instead of the process
    /// environment. Keys are full variable names, prefix included.
    #[must_use]
    pub fn from_map(prefix: impl Into<String>, vars: HashMap<String, String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: Some(vars),
        }
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        match &self.source {
            Some(map) => map.get(&var_name).cloned(),
            None => std::env::var(&var_name).ok(),
        }
    }

    /// Get a parsed value, failing on values that do not parse.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|v| {
                v.trim().parse().map_err(|e| {
                    DuplexError::config(format!("{}={v:?}: {e}", self.var_name(name)))
                })
            })
            .transpose()
    }

    /// Get a boolean value.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).map(|v| {
            matches!(
                v.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "enabled"
            )
        })
    }

    /// Get a duration in milliseconds.
    pub fn duration_millis(&self, name: &str) -> Result<Option<Duration>> {
        Ok(self.parse::<u64>(name)?.map(Duration::from_millis))
    }

    /// Apply every recognised variable on top of `config`.
    pub fn apply(&self, mut config: DuplexConfig) -> Result<DuplexConfig> {
        if let Some(v) = self.parse(vars::QUEUE_CAPACITY)? {
            config.queue_capacity = v;
        }
        if let Some(v) = self.parse(vars::BUFFER_CAPACITY)? {
            config.buffer_capacity = v;
        }
        if let Some(v) = self.parse(vars::MAX_COMMAND_LEN)? {
            config.max_command_len = v;
        }
        if let Some(v) = self.parse(vars::MAX_EXPECTATION_LEN)? {
            config.max_expectation_len = v;
        }
        if let Some(v) = self.parse(vars::HOOK_CAPACITY)? {
            config.hook_capacity = v;
        }
        if let Some(v) = self.duration_millis(vars::DEFAULT_TIMEOUT_MS)? {
            config.default_timeout = v;
        }
        if let Some(v) = self.get(vars::LINE_ENDING) {
            config.line_ending = parse_line_ending(&v)?;
        }
        if let Some(v) = self.get(vars::MATCH_MODE) {
            config.match_mode = parse_match_mode(&v)?;
        }
        if let Some(v) = self.bool(vars::IGNORE_NUL) {
            config.ignore_nul = v;
        }
        if let Some(v) = self.bool(vars::CLEAR_ON_SEND) {
            config.clear_on_send = v;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_line_ending(value: &str) -> Result<LineEnding> {
    match value.to_lowercase().as_str() {
        "lf" => Ok(LineEnding::Lf),
        "crlf" => Ok(LineEnding::CrLf),
        "cr" => Ok(LineEnding::Cr),
        other => Err(DuplexError::config(format!("unknown line ending: {other}"))),
    }
}

fn parse_match_mode(value: &str) -> Result<MatchMode> {
    match value.to_lowercase().as_str() {
        "every_byte" => Ok(MatchMode::EveryByte),
        "line_terminated" => Ok(MatchMode::LineTerminated),
        other => Err(DuplexError::config(format!("unknown match mode: {other}"))),
    }
}

/// Load the default configuration with `DUPLEX_*` overrides applied.
pub fn from_env() -> Result<DuplexConfig> {
    EnvConfig::default().apply(DuplexConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvConfig {
        let map = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        EnvConfig::from_map(DEFAULT_PREFIX, map)
    }

    #[test]
    fn env_config_prefix() {
        let config = EnvConfig::new("TEST");
        assert_eq!(config.var_name("foo"), "TEST_FOO");
        assert_eq!(config.var_name("bar_baz"), "TEST_BAR_BAZ");
    }

    #[test]
    fn apply_overrides() {
        let config = env(&[
            ("DUPLEX_QUEUE_CAPACITY", "3"),
            ("DUPLEX_DEFAULT_TIMEOUT_MS", "750"),
            ("DUPLEX_LINE_ENDING", "LF"),
            ("DUPLEX_CLEAR_ON_SEND", "yes"),
        ])
        .apply(DuplexConfig::default())
        .unwrap();

        assert_eq!(config.queue_capacity, 3);
        assert_eq!(config.default_timeout, Duration::from_millis(750));
        assert_eq!(config.line_ending, LineEnding::Lf);
        assert!(config.clear_on_send);
        assert_eq!(config.buffer_capacity, super::super::DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn apply_rejects_garbage() {
        let err = env(&[("DUPLEX_QUEUE_CAPACITY", "lots")])
            .apply(DuplexConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("DUPLEX_QUEUE_CAPACITY"));
    }

    #[test]
    fn apply_validates_result() {
        let result = env(&[("DUPLEX_BUFFER_CAPACITY", "0")]).apply(DuplexConfig::default());
        assert!(result.is_err());
    }
}
