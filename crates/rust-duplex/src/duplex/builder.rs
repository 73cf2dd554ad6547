//! Engine builder.

use std::path::Path;

use super::Duplex;
use crate::channel::Channel;
use crate::clock::{Clock, MonotonicClock};
use crate::config::{self, DuplexConfig};
use crate::error::Result;
use crate::expect::{PatternMatcher, RegexMatcher};

/// Builder for a [`Duplex`] engine.
///
/// The clock and matcher default to [`MonotonicClock`] and
/// [`RegexMatcher`]; replacing either changes the engine's type.
#[derive(Debug, Clone)]
pub struct DuplexBuilder<K = MonotonicClock, M = RegexMatcher> {
    config: DuplexConfig,
    clock: K,
    matcher: M,
}

impl DuplexBuilder {
    /// Create a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DuplexConfig::default(),
            clock: MonotonicClock::new(),
            matcher: RegexMatcher::new(),
        }
    }
}

impl Default for DuplexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, M> DuplexBuilder<K, M>
where
    K: Clock,
    M: PatternMatcher,
{
    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: DuplexConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a TOML or JSON file.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.config = config::file::load(path)?;
        Ok(self)
    }

    /// Apply `DUPLEX_*` environment overrides on top of the current
    /// configuration.
    pub fn env_overrides(mut self) -> Result<Self> {
        self.config = config::env::EnvConfig::default().apply(self.config)?;
        Ok(self)
    }

    /// Use a different clock.
    #[must_use]
    pub fn clock<K2: Clock>(self, clock: K2) -> DuplexBuilder<K2, M> {
        DuplexBuilder {
            config: self.config,
            clock,
            matcher: self.matcher,
        }
    }

    /// Use a different pattern matcher.
    #[must_use]
    pub fn matcher<M2: PatternMatcher>(self, matcher: M2) -> DuplexBuilder<K, M2> {
        DuplexBuilder {
            config: self.config,
            clock: self.clock,
            matcher,
        }
    }

    /// The configuration built so far.
    #[must_use]
    pub const fn config_ref(&self) -> &DuplexConfig {
        &self.config
    }

    /// Validate the configuration and bind `channel`.
    pub fn begin<C: Channel>(self, channel: C) -> Result<Duplex<C, K, M>> {
        self.config.validate()?;
        Ok(Duplex::from_parts(
            channel,
            self.clock,
            self.matcher,
            self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::expect::LiteralMatcher;
    use crate::mock::MockChannel;

    #[test]
    fn begin_applies_config() {
        let duplex = DuplexBuilder::new()
            .config(DuplexConfig::new().queue_capacity(3).buffer_capacity(256))
            .begin(MockChannel::new())
            .unwrap();
        assert_eq!(duplex.queue_capacity(), 3);
        assert_eq!(duplex.buffer_capacity(), 256);
    }

    #[test]
    fn begin_rejects_invalid_config() {
        let err = DuplexBuilder::new()
            .config(DuplexConfig::new().buffer_capacity(0))
            .begin(MockChannel::new())
            .unwrap_err();
        assert!(err.to_string().contains("buffer_capacity"));
    }

    #[test]
    fn swaps_clock_and_matcher() {
        let clock = ManualClock::starting_at(42);
        let duplex = DuplexBuilder::new()
            .clock(clock)
            .matcher(LiteralMatcher)
            .begin(MockChannel::new())
            .unwrap();
        assert_eq!(duplex.clock().now_millis(), 42);
    }
}
