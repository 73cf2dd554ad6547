//! Standing watches for unsolicited input.
//!
//! Hooks are checked against the accumulator every time a line terminator
//! arrives, whether or not a command is in flight. They never consume
//! input and never touch the command queue.

use std::sync::Arc;

use crate::error::{DuplexError, Field, Result};
use crate::expect::PatternMatcher;
use crate::types::Match;

/// Callback invoked when a hook pattern matches.
pub type HookFn = Arc<dyn Fn(&Match) + Send + Sync>;

struct Hook {
    pattern: String,
    callback: HookFn,
}

/// Bounded set of (pattern, callback) pairs, checked in registration order.
pub struct HookRegistry {
    hooks: Vec<Hook>,
    capacity: usize,
    max_pattern_len: usize,
}

impl HookRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(capacity: usize, max_pattern_len: usize) -> Self {
        Self {
            hooks: Vec::with_capacity(capacity),
            capacity,
            max_pattern_len,
        }
    }

    /// Register a hook.
    ///
    /// The pattern is checked with `matcher` up front so a typo is reported
    /// here rather than silently never matching.
    pub fn register<F>(
        &mut self,
        matcher: &dyn PatternMatcher,
        pattern: impl Into<String>,
        callback: F,
    ) -> Result<()>
    where
        F: Fn(&Match) + Send + Sync + 'static,
    {
        let pattern = pattern.into();
        if self.hooks.len() >= self.capacity {
            return Err(DuplexError::hook_registry_full(self.capacity));
        }
        if pattern.len() > self.max_pattern_len {
            return Err(DuplexError::oversized(
                Field::Expectation,
                pattern,
                self.max_pattern_len,
            ));
        }
        matcher.check(&pattern)?;

        tracing::debug!(pattern = %pattern, "Hook registered");
        self.hooks.push(Hook {
            pattern,
            callback: Arc::new(callback),
        });
        Ok(())
    }

    /// Test every hook against `input`, invoking each one that matches.
    ///
    /// Returns the number of hooks fired.
    pub fn run(&self, matcher: &dyn PatternMatcher, input: &[u8]) -> usize {
        let mut fired = 0;
        for hook in &self.hooks {
            if let Some(m) = matcher.find(&hook.pattern, input) {
                tracing::debug!(pattern = %hook.pattern, matched = %m, "Hook Triggered");
                (hook.callback)(&m);
                fired += 1;
            }
        }
        fired
    }

    /// Registered patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().map(|h| h.pattern.as_str())
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if no hooks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Maximum number of hooks.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("patterns", &self.patterns().collect::<Vec<_>>())
            .field("capacity", &self.capacity)
            .finish()
    }
}
