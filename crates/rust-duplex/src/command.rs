//! Command records.
//!
//! A [`Command`] pairs a line of text to transmit with the pattern its
//! response must match, the callbacks that resolve it, a timeout and an
//! optional start delay. Records are plain values: cloning one clones its
//! text and shares its callbacks, so a failed command handed to a failure
//! callback can be re-queued as-is.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::queue::QueueHandle;
use crate::types::Match;

/// Callback invoked when a command's expectation matches.
pub type SuccessFn = Arc<dyn Fn(&Match, &mut QueueHandle<'_>) + Send + Sync>;

/// Callback invoked with a copy of a command that timed out.
pub type FailureFn = Arc<dyn Fn(&Command, &mut QueueHandle<'_>) + Send + Sync>;

/// What happens when a command succeeds.
///
/// `Plain` runs its callbacks in order. `Continuation` first resolves the
/// wrapped action, then queues `next` to run immediately after, which is how
/// a chain of commands is expressed as a single queued record.
#[derive(Clone)]
pub enum OnSuccess {
    /// Callbacks run in order.
    Plain(Vec<SuccessFn>),

    /// Resolve `first`, then queue `next` with [`Timing::Head`](crate::Timing::Head).
    Continuation {
        /// The action of this link.
        first: Box<OnSuccess>,
        /// The downstream link, owned outright.
        next: Box<Command>,
    },
}

impl Default for OnSuccess {
    fn default() -> Self {
        Self::Plain(Vec::new())
    }
}

impl OnSuccess {
    /// Add a callback that runs before everything already attached.
    pub fn prepend(&mut self, callback: SuccessFn) {
        match self {
            Self::Plain(callbacks) => callbacks.insert(0, callback),
            Self::Continuation { first, .. } => first.prepend(callback),
        }
    }

    /// Add a callback that runs after the callbacks of this link but before
    /// any continuation is queued.
    pub fn append(&mut self, callback: SuccessFn) {
        match self {
            Self::Plain(callbacks) => callbacks.push(callback),
            Self::Continuation { first, .. } => first.append(callback),
        }
    }

    /// Wrap this action so that `next` is queued once it has run.
    #[must_use]
    pub fn then(self, next: Command) -> Self {
        Self::Continuation {
            first: Box::new(self),
            next: Box::new(next),
        }
    }

    /// The directly chained downstream command, if any.
    #[must_use]
    pub fn next(&self) -> Option<&Command> {
        match self {
            Self::Plain(_) => None,
            Self::Continuation { next, .. } => Some(next),
        }
    }

    /// Number of callbacks attached, continuations excluded.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        match self {
            Self::Plain(callbacks) => callbacks.len(),
            Self::Continuation { first, .. } => first.callback_count(),
        }
    }

    /// Run the callbacks, then queue any continuation.
    pub(crate) fn resolve(self, matched: &Match, queue: &mut QueueHandle<'_>) {
        match self {
            Self::Plain(callbacks) => {
                for callback in &callbacks {
                    callback(matched, queue);
                }
            }
            Self::Continuation { first, next } => {
                (*first).resolve(matched, queue);
                queue.continue_with(*next);
            }
        }
    }
}

impl fmt::Debug for OnSuccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(callbacks) => write!(f, "Plain({} callbacks)", callbacks.len()),
            Self::Continuation { first, next } => f
                .debug_struct("Continuation")
                .field("first", first)
                .field("next", &next.command)
                .finish(),
        }
    }
}

/// A queued unit of work: transmit, then await a matching response.
#[derive(Clone, Default)]
pub struct Command {
    pub(crate) command: String,
    pub(crate) expectation: String,
    pub(crate) success: OnSuccess,
    pub(crate) failure: Vec<FailureFn>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) delay: Duration,
}

impl Command {
    /// Create a command expecting `expectation` in response.
    ///
    /// No callbacks are attached, the engine's default timeout applies and
    /// the command may start as soon as it reaches the head of the queue.
    #[must_use]
    pub fn new(command: impl Into<String>, expectation: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            expectation: expectation.into(),
            ..Self::default()
        }
    }

    /// Attach a success callback.
    #[must_use]
    pub fn on_success<F>(self, callback: F) -> Self
    where
        F: Fn(&Match) + Send + Sync + 'static,
    {
        self.on_success_with(move |m, _| callback(m))
    }

    /// Attach a success callback that may queue further commands.
    #[must_use]
    pub fn on_success_with<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Match, &mut QueueHandle<'_>) + Send + Sync + 'static,
    {
        self.success.append(Arc::new(callback));
        self
    }

    /// Attach a failure callback.
    #[must_use]
    pub fn on_failure<F>(self, callback: F) -> Self
    where
        F: Fn(&Self) + Send + Sync + 'static,
    {
        self.on_failure_with(move |cmd, _| callback(cmd))
    }

    /// Attach a failure callback that may queue further commands, for
    /// instance a retry of the failed command.
    #[must_use]
    pub fn on_failure_with<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Self, &mut QueueHandle<'_>) + Send + Sync + 'static,
    {
        self.failure.push(Arc::new(callback));
        self
    }

    /// Set the response timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the delay between queueing and the earliest transmission.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Add callbacks that run before every callback already attached.
    pub fn prepend_callbacks(&mut self, success: Option<SuccessFn>, failure: Option<FailureFn>) {
        if let Some(success) = success {
            self.success.prepend(success);
        }
        if let Some(failure) = failure {
            self.failure.insert(0, failure);
        }
    }

    /// The text transmitted to the peripheral.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The pattern the response must match.
    #[must_use]
    pub fn expectation(&self) -> &str {
        &self.expectation
    }

    /// The explicit timeout, if one was set.
    #[must_use]
    pub const fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// The requested start delay.
    #[must_use]
    pub const fn start_delay(&self) -> Duration {
        self.delay
    }

    /// The success action.
    #[must_use]
    pub const fn success(&self) -> &OnSuccess {
        &self.success
    }

    /// Number of failure callbacks attached.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failure.len()
    }

    /// The command chained to run after this one, if any.
    #[must_use]
    pub fn next(&self) -> Option<&Self> {
        self.success.next()
    }

    /// Run every failure callback with this record.
    pub(crate) fn fail(&self, queue: &mut QueueHandle<'_>) {
        for callback in &self.failure {
            callback(self, queue);
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("command", &self.command)
            .field("expectation", &self.expectation)
            .field("success", &self.success)
            .field("failure", &self.failure.len())
            .field("timeout", &self.timeout)
            .field("delay", &self.delay)
            .finish()
    }
}

/// A failure callback that logs `Command '<command>' failed.`.
#[must_use]
pub fn log_failure() -> FailureFn {
    Arc::new(|cmd: &Command, _: &mut QueueHandle<'_>| {
        tracing::warn!(command = %cmd.command, "Command '{}' failed.", cmd.command);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_defaults() {
        let cmd = Command::new("AT", "OK");
        assert_eq!(cmd.command(), "AT");
        assert_eq!(cmd.expectation(), "OK");
        assert_eq!(cmd.timeout_override(), None);
        assert_eq!(cmd.start_delay(), Duration::ZERO);
        assert_eq!(cmd.success().callback_count(), 0);
        assert_eq!(cmd.failure_count(), 0);
        assert!(cmd.next().is_none());
    }

    #[test]
    fn builder_attaches_callbacks() {
        let cmd = Command::new("AT+CSQ", r"\+CSQ: (\d+)")
            .on_success(|_| {})
            .on_success(|_| {})
            .on_failure(|_| {})
            .timeout(Duration::from_millis(300))
            .delay(Duration::from_millis(50));

        assert_eq!(cmd.success().callback_count(), 2);
        assert_eq!(cmd.failure_count(), 1);
        assert_eq!(cmd.timeout_override(), Some(Duration::from_millis(300)));
        assert_eq!(cmd.start_delay(), Duration::from_millis(50));
    }

    #[test]
    fn then_wraps_in_continuation() {
        let first = Command::new("A", "OK").on_success(|_| {});
        let next = Command::new("B", "OK");
        let success = first.success.clone().then(next);

        assert_eq!(success.next().map(Command::command), Some("B"));
        assert_eq!(success.callback_count(), 1);
    }

    #[test]
    fn prepend_reaches_through_continuation() {
        let mut success = OnSuccess::default().then(Command::new("B", "OK"));
        success.prepend(Arc::new(|_: &Match, _: &mut QueueHandle<'_>| {}));
        assert_eq!(success.callback_count(), 1);
        assert!(success.next().is_some());
    }

    #[test]
    fn debug_shows_chain() {
        let cmd = Command::new("A", "OK");
        let chained = Command {
            success: OnSuccess::default().then(Command::new("B", "OK")),
            ..cmd
        };
        let debug = format!("{chained:?}");
        assert!(debug.contains("Continuation"));
        assert!(debug.contains("\"B\""));
    }
}
