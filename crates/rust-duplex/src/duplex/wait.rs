//! Draining the queue.
//!
//! Both waits poll until the queue is empty or an overall timeout expires.
//! They must not be called from inside a command or hook callback: the
//! engine is already borrowed there, and the queue being drained is the one
//! the callback was invoked from.

use std::time::Duration;

use super::Duplex;
use crate::channel::Channel;
use crate::clock::{Clock, duration_millis};
use crate::error::Result;
use crate::expect::PatternMatcher;

/// Tracks an optional overall wait timeout against the engine's clock.
#[derive(Debug, Clone, Copy)]
struct WaitDeadline {
    started: u64,
    limit: Option<u64>,
}

impl WaitDeadline {
    fn new(started: u64, timeout: Option<Duration>) -> Self {
        Self {
            started,
            limit: timeout.map(duration_millis),
        }
    }

    fn expired(&self, now: u64) -> bool {
        self.limit
            .is_some_and(|limit| now > self.started.saturating_add(limit))
    }
}

impl<C, K, M> Duplex<C, K, M>
where
    C: Channel,
    K: Clock,
    M: PatternMatcher,
{
    /// Poll until the queue drains.
    ///
    /// Returns `Ok(false)` if `timeout` elapsed first. `None` waits for as
    /// long as it takes. This busy-polls the channel.
    pub fn wait(&mut self, timeout: Option<Duration>) -> Result<bool> {
        self.wait_with(timeout, || {})
    }

    /// Poll until the queue drains, calling `keepalive` before every poll.
    ///
    /// Use the keepalive to service a watchdog or anything else that must
    /// not starve while the caller is blocked here.
    pub fn wait_with<F>(&mut self, timeout: Option<Duration>, mut keepalive: F) -> Result<bool>
    where
        F: FnMut(),
    {
        let deadline = WaitDeadline::new(self.clock.now_millis(), timeout);
        while !self.queue.is_empty() {
            if deadline.expired(self.clock.now_millis()) {
                tracing::debug!(remaining = self.queue.len(), "Wait timed out");
                return Ok(false);
            }
            keepalive();
            self.poll()?;
            std::hint::spin_loop();
        }
        Ok(true)
    }

    /// Poll until the queue drains, sleeping between polls.
    ///
    /// Sleeps for the configured `wait_poll_interval` on the tokio timer
    /// instead of spinning. Returns `Ok(false)` if `timeout` elapsed first.
    pub async fn wait_async(&mut self, timeout: Option<Duration>) -> Result<bool> {
        let deadline = WaitDeadline::new(self.clock.now_millis(), timeout);
        let interval = self.config.wait_poll_interval;
        while !self.queue.is_empty() {
            if deadline.expired(self.clock.now_millis()) {
                tracing::debug!(remaining = self.queue.len(), "Wait timed out");
                return Ok(false);
            }
            self.poll()?;
            if self.queue.is_empty() {
                break;
            }
            tokio::time::sleep(interval).await;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_never_expires() {
        let deadline = WaitDeadline::new(0, None);
        assert!(!deadline.expired(u64::MAX));
    }

    #[test]
    fn limit_is_exclusive() {
        let deadline = WaitDeadline::new(100, Some(Duration::from_millis(50)));
        assert!(!deadline.expired(150));
        assert!(deadline.expired(151));
    }
}
