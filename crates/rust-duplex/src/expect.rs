//! Input accumulation and pattern matching.
//!
//! This module provides the bounded input accumulator, the pattern
//! matcher capability the engine relies on, and the compiled-pattern cache
//! behind the default regex matcher.

mod buffer;
mod cache;
mod matcher;

pub use buffer::InputBuffer;
pub use cache::{CacheStats, DEFAULT_CACHE_SIZE, RegexCache};
pub use matcher::{LiteralMatcher, PatternMatcher, RegexMatcher};
