//! Pattern matchers.
//!
//! The engine treats pattern matching as a black box: given a pattern and
//! the accumulated input, report where the first match starts, where it
//! ends and which groups it captured. [`RegexMatcher`] is the default;
//! [`LiteralMatcher`] does plain substring search.

use std::sync::Arc;

use super::cache::RegexCache;
use crate::error::{DuplexError, Result};
use crate::types::Match;

/// A pattern matching capability.
pub trait PatternMatcher {
    /// Find the first match of `pattern` in `haystack`.
    ///
    /// Patterns that cannot be compiled never match.
    fn find(&self, pattern: &str, haystack: &[u8]) -> Option<Match>;

    /// Check that `pattern` is usable before it is queued or registered.
    fn check(&self, pattern: &str) -> Result<()>;
}

impl<M: PatternMatcher + ?Sized> PatternMatcher for Box<M> {
    fn find(&self, pattern: &str, haystack: &[u8]) -> Option<Match> {
        (**self).find(pattern, haystack)
    }

    fn check(&self, pattern: &str) -> Result<()> {
        (**self).check(pattern)
    }
}

impl<M: PatternMatcher + ?Sized> PatternMatcher for Arc<M> {
    fn find(&self, pattern: &str, haystack: &[u8]) -> Option<Match> {
        (**self).find(pattern, haystack)
    }

    fn check(&self, pattern: &str) -> Result<()> {
        (**self).check(pattern)
    }
}

/// Regular-expression matcher over raw bytes.
///
/// Offsets are byte offsets into the accumulator; captured groups are
/// decoded lossily. Groups that did not participate in the match are
/// reported as empty strings so capture indices stay stable.
#[derive(Debug, Clone, Default)]
pub struct RegexMatcher {
    cache: Arc<RegexCache>,
}

impl RegexMatcher {
    /// Create a matcher with its own cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a matcher sharing `cache`.
    #[must_use]
    pub const fn with_cache(cache: Arc<RegexCache>) -> Self {
        Self { cache }
    }

    /// Get the compiled pattern cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<RegexCache> {
        &self.cache
    }
}

impl PatternMatcher for RegexMatcher {
    fn find(&self, pattern: &str, haystack: &[u8]) -> Option<Match> {
        let regex = match self.cache.get_or_compile(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Pattern failed to compile");
                return None;
            }
        };
        let caps = regex.captures(haystack)?;
        let whole = caps.get(0)?;
        let captures = caps
            .iter()
            .skip(1)
            .map(|group| {
                group
                    .map(|g| String::from_utf8_lossy(g.as_bytes()).into_owned())
                    .unwrap_or_default()
            })
            .collect();
        Some(
            Match::new(
                whole.start(),
                whole.end(),
                String::from_utf8_lossy(whole.as_bytes()),
            )
            .with_captures(captures),
        )
    }

    fn check(&self, pattern: &str) -> Result<()> {
        self.cache
            .get_or_compile(pattern)
            .map(|_| ())
            .map_err(|e| DuplexError::invalid_pattern(pattern, e.to_string()))
    }
}

/// Exact substring matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralMatcher;

impl PatternMatcher for LiteralMatcher {
    fn find(&self, pattern: &str, haystack: &[u8]) -> Option<Match> {
        let needle = pattern.as_bytes();
        let start = if needle.is_empty() {
            0
        } else {
            haystack.windows(needle.len()).position(|w| w == needle)?
        };
        Some(Match::new(start, start + needle.len(), pattern))
    }

    fn check(&self, _pattern: &str) -> Result<()> {
        Ok(())
    }
}
