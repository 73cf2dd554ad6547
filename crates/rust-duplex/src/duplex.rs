//! The duplex engine.
//!
//! [`Duplex`] owns a channel, a command queue, the input accumulator and the
//! hook registry. Nothing happens in the background: each call to
//! [`poll`](Duplex::poll) advances the state machine one step.
//!
//! # Example
//!
//! ```
//! use rust_duplex::{Command, Duplex, MockChannel, Timing};
//!
//! let modem = MockChannel::new();
//! let mut duplex = Duplex::begin(modem.clone());
//!
//! duplex
//!     .enqueue(
//!         Command::new("AT+CSQ", r"\+CSQ: (\d+),")
//!             .on_success(|m| println!("signal: {}", m.captures[0])),
//!         Timing::Tail,
//!     )
//!     .unwrap();
//!
//! duplex.poll().unwrap();
//! assert_eq!(modem.take_output_str(), "AT+CSQ\r\n");
//!
//! modem.queue_input_str("+CSQ: 17,99\r\nOK\r\n");
//! duplex.poll().unwrap();
//! assert_eq!(duplex.queue_length(), 0);
//! ```

mod builder;
mod wait;

use std::borrow::Cow;
use std::time::Duration;

pub use builder::DuplexBuilder;

use crate::chain::{build_chain, for_each_link};
use crate::channel::Channel;
use crate::clock::{Clock, MonotonicClock, duration_millis};
use crate::command::{Command, FailureFn, SuccessFn};
use crate::config::DuplexConfig;
use crate::error::{DuplexError, Result};
use crate::expect::{InputBuffer, PatternMatcher, RegexMatcher};
use crate::hooks::HookRegistry;
use crate::queue::{CommandQueue, QueueHandle, QueuedCommand};
use crate::stats::DuplexStats;
use crate::types::{EngineState, Match, MatchMode, Timing};

/// Queued command/response exchange over one channel.
pub struct Duplex<C, K = MonotonicClock, M = RegexMatcher> {
    channel: C,
    clock: K,
    matcher: M,
    config: DuplexConfig,
    queue: CommandQueue,
    buffer: InputBuffer,
    hooks: HookRegistry,
    state: EngineState,
    /// Clock reading after which the in-flight command has timed out.
    deadline: u64,
    stats: DuplexStats,
}

impl<C: Channel> Duplex<C> {
    /// Bind `channel` with the default configuration, clock and matcher.
    #[must_use]
    pub fn begin(channel: C) -> Self {
        Self::from_parts(
            channel,
            MonotonicClock::new(),
            RegexMatcher::new(),
            DuplexConfig::default(),
        )
    }
}

impl<C, K, M> Duplex<C, K, M>
where
    C: Channel,
    K: Clock,
    M: PatternMatcher,
{
    pub(crate) fn from_parts(channel: C, clock: K, matcher: M, config: DuplexConfig) -> Self {
        tracing::debug!(
            queue_capacity = config.queue_capacity,
            buffer_capacity = config.buffer_capacity,
            "Duplex engine started"
        );
        Self {
            queue: CommandQueue::new(&config),
            buffer: InputBuffer::new(config.buffer_capacity),
            hooks: HookRegistry::new(config.hook_capacity, config.max_expectation_len),
            channel,
            clock,
            matcher,
            config,
            state: EngineState::Idle,
            deadline: 0,
            stats: DuplexStats::default(),
        }
    }

    fn handle(&mut self, now: u64) -> QueueHandle<'_> {
        QueueHandle::new(&mut self.queue, &self.matcher, now)
    }

    /// Queue a command.
    ///
    /// Fails without modifying the queue if it is full, if the command or
    /// expectation text is over its bound, or if the expectation is not a
    /// valid pattern.
    pub fn enqueue(&mut self, command: Command, timing: Timing) -> Result<()> {
        let now = self.clock.now_millis();
        self.handle(now).enqueue(command, timing)
    }

    /// Queue a copy of a prepared command.
    pub fn execute(&mut self, command: &Command, timing: Timing) -> Result<()> {
        self.enqueue(command.clone(), timing)
    }

    /// Queue `commands` to run strictly in order.
    ///
    /// `success` and `failure` run for every link, before the link's own
    /// callbacks. Every link is checked up front, so a chain is either
    /// accepted whole or not at all.
    pub fn enqueue_chain<I>(
        &mut self,
        commands: I,
        timing: Timing,
        success: Option<SuccessFn>,
        failure: Option<FailureFn>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = Command>,
        I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
    {
        let chain = build_chain(commands, success, failure)?;
        for_each_link(&chain, |link| {
            self.queue.validate(link)?;
            self.matcher.check(&link.expectation)
        })?;
        self.enqueue(chain, timing)
    }

    /// Register a standing watch for unsolicited input.
    ///
    /// The callback runs each time a line terminator arrives and the
    /// accumulated input matches `pattern`.
    pub fn register_hook<F>(&mut self, pattern: impl Into<String>, callback: F) -> Result<()>
    where
        F: Fn(&Match) + Send + Sync + 'static,
    {
        self.hooks.register(&self.matcher, pattern, callback)
    }

    /// Advance the engine one step.
    ///
    /// In order: resolve an expired in-flight command, drain the bytes the
    /// channel reports as available, then transmit the head command if the
    /// engine is idle and the command is due.
    ///
    /// # Errors
    ///
    /// Returns channel I/O errors. The engine stays consistent: a command
    /// whose line could not be written stays at the head and is retried on
    /// the next poll. A command whose line was written but whose flush
    /// failed is in flight and resolves by match or timeout.
    pub fn poll(&mut self) -> Result<()> {
        self.check_timeout();
        self.drain_input()?;
        self.start_next()
    }

    fn check_timeout(&mut self) {
        if !self.state.is_awaiting() {
            return;
        }
        let now = self.clock.now_millis();
        if now <= self.deadline {
            return;
        }

        self.state = EngineState::Idle;
        self.buffer.clear();
        let Some(entry) = self.queue.pop_head() else {
            return;
        };
        let mut failed = entry.into_command();
        failed.delay = Duration::ZERO;
        self.stats.commands_timed_out += 1;
        tracing::debug!(command = %failed.command, deadline = self.deadline, now, "Command Timeout");

        failed.fail(&mut self.handle(now));
    }

    fn drain_input(&mut self) -> Result<()> {
        let available = DuplexError::with_io_context(
            self.channel.available(),
            "checking for available input",
        )?;
        if available == 0 {
            return Ok(());
        }
        tracing::trace!(available, "Reading input");

        for _ in 0..available {
            let byte = DuplexError::with_io_context(self.channel.read_byte(), "reading input")?;
            if byte == 0 && self.config.ignore_nul {
                self.stats.nul_bytes_dropped += 1;
                continue;
            }
            self.buffer.push(byte);
            self.stats.bytes_received += 1;

            let line_end = byte == b'\n';
            if self.state.is_awaiting()
                && (line_end || self.config.match_mode == MatchMode::EveryByte)
            {
                self.try_match();
            }
            if line_end && !self.hooks.is_empty() {
                let fired = self.hooks.run(&self.matcher, self.buffer.as_slice());
                self.stats.hooks_fired += fired as u64;
            }
        }
        Ok(())
    }

    fn try_match(&mut self) {
        let Some(head) = self.queue.head() else {
            self.state = EngineState::Idle;
            return;
        };
        let Some(matched) = self
            .matcher
            .find(head.command().expectation(), self.buffer.as_slice())
        else {
            return;
        };
        let Some(entry) = self.queue.pop_head() else {
            return;
        };

        self.state = EngineState::Idle;
        self.stats.commands_matched += 1;
        tracing::debug!(command = %entry.command().command, matched = %matched, "Expectation Matched");

        let now = self.clock.now_millis();
        entry
            .into_command()
            .success
            .resolve(&matched, &mut self.handle(now));
        self.buffer.consume(matched.consumed());
    }

    fn start_next(&mut self) -> Result<()> {
        if self.state.is_awaiting() {
            return Ok(());
        }
        let now = self.clock.now_millis();
        let Some(head) = self.queue.head() else {
            return Ok(());
        };
        if head.due_millis() > now {
            return Ok(());
        }

        if self.config.clear_on_send {
            self.buffer.clear();
        }
        let line = head.command().command();
        tracing::debug!(command = %line, "-->");
        DuplexError::with_io_context(
            self.channel.write_line(line),
            format!("writing command '{line}'"),
        )?;

        // Armed before flushing: the line is out even if the flush fails.
        self.deadline = now.saturating_add(duration_millis(head.timeout()));
        self.state = EngineState::Awaiting;
        self.queue.set_head_in_flight(true);
        self.stats.commands_sent += 1;

        DuplexError::with_io_context(self.channel.flush(), "flushing channel")
    }

    /// Drop the head command without running any of its callbacks.
    ///
    /// Clears the accumulator and returns the engine to idle. Returns
    /// `false` if the queue was empty.
    pub fn abort(&mut self) -> bool {
        let Some(entry) = self.queue.pop_head() else {
            return false;
        };
        tracing::debug!(command = %entry.command().command, "Command Aborted");
        self.buffer.clear();
        self.state = EngineState::Idle;
        self.stats.commands_aborted += 1;
        true
    }

    /// Copy the accumulated input into `out`, truncated to its length.
    ///
    /// Returns the number of bytes copied.
    pub fn get_response(&self, out: &mut [u8]) -> usize {
        self.buffer.copy_to(out)
    }

    /// The accumulated input as text.
    #[must_use]
    pub fn response(&self) -> Cow<'_, str> {
        self.buffer.as_str_lossy()
    }

    /// The accumulated input.
    #[must_use]
    pub fn response_bytes(&mut self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Bytes currently accumulated.
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Accumulator capacity in bytes.
    #[must_use]
    pub const fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Number of queued commands, the in-flight one included.
    #[must_use]
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    /// Maximum number of queued commands.
    #[must_use]
    pub const fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Queued commands, head first.
    pub fn queued(&self) -> impl Iterator<Item = &QueuedCommand> {
        self.queue.iter()
    }

    /// Whether a command is in flight.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Running counters.
    #[must_use]
    pub const fn stats(&self) -> DuplexStats {
        DuplexStats {
            bytes_evicted: self.buffer.bytes_evicted(),
            ..self.stats
        }
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &DuplexConfig {
        &self.config
    }

    /// The engine's clock.
    #[must_use]
    pub const fn clock(&self) -> &K {
        &self.clock
    }

    /// The engine's pattern matcher.
    #[must_use]
    pub const fn matcher(&self) -> &M {
        &self.matcher
    }

    /// The bound channel.
    #[must_use]
    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// The bound channel, mutably.
    ///
    /// Writing to it directly while a command is in flight will confuse the
    /// peripheral's reply sequence.
    pub const fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Release the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

impl<C, K, M> std::fmt::Debug for Duplex<C, K, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Duplex")
            .field("state", &self.state)
            .field("queue", &self.queue)
            .field("buffer", &self.buffer)
            .field("hooks", &self.hooks)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
