//! rust-duplex: queued command/response exchange for serial peripherals
//!
//! This crate drives half-duplex, line-oriented conversations with modems,
//! sensors and other command-driven devices without blocking the caller's
//! control loop. Commands are queued with an expected-response pattern, a
//! timeout, an optional start delay and success/failure callbacks; the
//! engine transmits them one at a time and resolves each exactly once.
//!
//! # Features
//!
//! - **Bounded command queue** with tail (FIFO) and head (run next) insertion
//! - **Incremental matching** of received bytes against the in-flight
//!   expectation, with regex captures
//! - **Command chains** executed strictly in order
//! - **Hooks** for unsolicited messages such as `RING` or `+CMTI`
//! - **Serial port channel** (feature: `serial`)
//! - **Mock channel** for testing (feature: `mock`)
//!
//! # Example
//!
//! ```
//! use rust_duplex::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let modem = MockChannel::new();
//! let mut duplex = Duplex::begin(modem.clone());
//!
//! duplex.register_hook("RING", |_| println!("incoming call"))?;
//! duplex.enqueue(
//!     Command::new("ATI", "OK").on_failure(|cmd| eprintln!("{} got no reply", cmd.command())),
//!     Timing::Tail,
//! )?;
//!
//! duplex.poll()?;
//! modem.queue_input_str("Quectel\r\nOK\r\n");
//! assert!(duplex.wait(None)?);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod channel;
pub mod clock;
pub mod command;
pub mod config;
pub mod duplex;
pub mod error;
pub mod expect;
pub mod hooks;
pub mod prelude;
pub mod queue;
pub mod stats;
pub mod types;

/// Scripted channel for testing.
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use chain::build_chain;
#[cfg(feature = "serial")]
pub use channel::{SerialChannel, serial::SerialOptions};
pub use channel::Channel;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use command::{Command, FailureFn, OnSuccess, SuccessFn, log_failure};
pub use config::DuplexConfig;
pub use duplex::{Duplex, DuplexBuilder};
pub use error::{DuplexError, Field, Result};
pub use expect::{InputBuffer, LiteralMatcher, PatternMatcher, RegexCache, RegexMatcher};
pub use hooks::{HookFn, HookRegistry};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockChannel;
pub use queue::{CommandQueue, QueueHandle, QueuedCommand};
pub use stats::DuplexStats;
pub use types::{EngineState, LineEnding, Match, MatchMode, Timing};
