//! Convenient re-exports for common rust-duplex usage.
//!
//! ```
//! use rust_duplex::prelude::*;
//!
//! let mut duplex = Duplex::begin(MockChannel::new());
//! duplex.enqueue(Command::new("AT", "OK"), Timing::Tail).unwrap();
//! assert_eq!(duplex.queue_length(), 1);
//! ```

// Engine
pub use crate::duplex::{Duplex, DuplexBuilder};

// Commands
pub use crate::command::{Command, FailureFn, SuccessFn, log_failure};
pub use crate::queue::QueueHandle;

// Error handling
pub use crate::error::{DuplexError, Result};

// Common types
pub use crate::config::DuplexConfig;
pub use crate::types::{EngineState, LineEnding, Match, MatchMode, Timing};

// Collaborators
pub use crate::channel::Channel;
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::expect::{LiteralMatcher, PatternMatcher, RegexMatcher};

#[cfg(feature = "serial")]
pub use crate::channel::SerialChannel;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockChannel;
