//! Bounded command queue.
//!
//! Commands are removed only from the head. New commands are appended at
//! the tail ([`Timing::Tail`]) or placed ahead of everything that has not
//! started yet ([`Timing::Head`]). Once the head has been transmitted it is
//! pinned: a head insertion lands directly behind it instead of displacing
//! it, so the record being matched is always the one that was sent.

use std::time::Duration;

use crate::clock::duration_millis;
use crate::command::Command;
use crate::config::DuplexConfig;
use crate::error::{DuplexError, Field, Result};
use crate::expect::PatternMatcher;
use crate::types::Timing;

/// A command together with its scheduling data.
#[derive(Debug, Clone)]
pub struct QueuedCommand {
    command: Command,
    due: u64,
    timeout: Duration,
}

impl QueuedCommand {
    /// The queued command.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.command
    }

    /// Earliest clock reading at which the command may be transmitted.
    #[must_use]
    pub const fn due_millis(&self) -> u64 {
        self.due
    }

    /// Response timeout armed on transmission.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn into_command(self) -> Command {
        self.command
    }
}

/// Ordered, bounded sequence of commands.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    entries: Vec<QueuedCommand>,
    capacity: usize,
    max_command_len: usize,
    max_expectation_len: usize,
    default_timeout: Duration,
    head_in_flight: bool,
}

impl CommandQueue {
    /// Create an empty queue with the bounds of `config`.
    #[must_use]
    pub fn new(config: &DuplexConfig) -> Self {
        Self {
            entries: Vec::with_capacity(config.queue_capacity),
            capacity: config.queue_capacity,
            max_command_len: config.max_command_len,
            max_expectation_len: config.max_expectation_len,
            default_timeout: config.default_timeout,
            head_in_flight: false,
        }
    }

    /// Check that the text fields of `command` fit their bounds.
    pub fn validate(&self, command: &Command) -> Result<()> {
        if command.command.len() > self.max_command_len {
            return Err(DuplexError::oversized(
                Field::Command,
                command.command.as_str(),
                self.max_command_len,
            ));
        }
        if command.expectation.len() > self.max_expectation_len {
            return Err(DuplexError::oversized(
                Field::Expectation,
                command.expectation.as_str(),
                self.max_expectation_len,
            ));
        }
        Ok(())
    }

    /// Insert `command` according to `timing`.
    ///
    /// The start delay is converted to an absolute due time relative to
    /// `now`. Returns the index the command was placed at. Nothing is
    /// modified on error.
    pub fn push(&mut self, command: Command, timing: Timing, now: u64) -> Result<usize> {
        if self.is_full() {
            return Err(DuplexError::queue_full(self.capacity));
        }
        self.validate(&command)?;

        let index = match timing {
            Timing::Tail => self.entries.len(),
            Timing::Head if self.head_in_flight => 1,
            Timing::Head => 0,
        };
        let entry = QueuedCommand {
            due: now.saturating_add(duration_millis(command.delay)),
            timeout: command.timeout.unwrap_or(self.default_timeout),
            command,
        };
        self.entries.insert(index, entry);
        Ok(index)
    }

    /// Remove the head, shifting every later entry forward.
    pub fn pop_head(&mut self) -> Option<QueuedCommand> {
        if self.entries.is_empty() {
            return None;
        }
        self.head_in_flight = false;
        Some(self.entries.remove(0))
    }

    /// The head entry.
    #[must_use]
    pub fn head(&self) -> Option<&QueuedCommand> {
        self.entries.first()
    }

    /// Iterate entries from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedCommand> {
        self.entries.iter()
    }

    /// Current number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if the queue is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the head has been transmitted and is awaiting its response.
    #[must_use]
    pub const fn head_in_flight(&self) -> bool {
        self.head_in_flight
    }

    pub(crate) fn set_head_in_flight(&mut self, in_flight: bool) {
        self.head_in_flight = in_flight && !self.entries.is_empty();
    }
}

/// Access to the queue handed to command callbacks.
///
/// Callbacks run while the engine is resolving a command, so they cannot
/// borrow the engine itself. The handle lets them queue follow-up work
/// (retries, continuations) under the same rules as
/// [`Duplex::enqueue`](crate::Duplex::enqueue).
pub struct QueueHandle<'a> {
    queue: &'a mut CommandQueue,
    matcher: &'a dyn PatternMatcher,
    now: u64,
}

impl<'a> QueueHandle<'a> {
    pub(crate) fn new(
        queue: &'a mut CommandQueue,
        matcher: &'a dyn PatternMatcher,
        now: u64,
    ) -> Self {
        Self {
            queue,
            matcher,
            now,
        }
    }

    /// Queue a command.
    pub fn enqueue(&mut self, command: Command, timing: Timing) -> Result<()> {
        let result = self
            .matcher
            .check(&command.expectation)
            .and_then(|()| self.queue.push(command, timing, self.now).map(|_| ()));
        if let Err(e) = &result {
            tracing::warn!(error = %e, ?timing, "Command rejected");
        }
        result
    }

    /// Current number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if no commands are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if the queue is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Clock reading at which the callback runs.
    #[must_use]
    pub const fn now_millis(&self) -> u64 {
        self.now
    }

    /// Queue the next link of a chain to run immediately.
    ///
    /// If it cannot be queued the link is failed instead, so the chain's
    /// failure callbacks still learn that it stopped.
    pub(crate) fn continue_with(&mut self, next: Command) {
        tracing::debug!(command = %next.command, "Queueing chained command");
        if self.enqueue(next.clone(), Timing::Head).is_err() {
            tracing::warn!(command = %next.command, "Chain stopped: continuation not queued");
            let mut failed = next;
            failed.delay = Duration::ZERO;
            failed.fail(self);
        }
    }
}

impl std::fmt::Debug for QueueHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueHandle")
            .field("len", &self.queue.len())
            .field("capacity", &self.queue.capacity())
            .field("now", &self.now)
            .finish()
    }
}
