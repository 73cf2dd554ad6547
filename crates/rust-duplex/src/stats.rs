//! Engine counters.

use serde::Serialize;

/// Running totals for one engine instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DuplexStats {
    /// Commands written to the channel.
    pub commands_sent: u64,
    /// Commands resolved by a match.
    pub commands_matched: u64,
    /// Commands resolved by a timeout.
    pub commands_timed_out: u64,
    /// Commands removed by [`Duplex::abort`](crate::Duplex::abort).
    pub commands_aborted: u64,
    /// Bytes accepted into the accumulator.
    pub bytes_received: u64,
    /// Bytes dropped by the accumulator's sliding window.
    pub bytes_evicted: u64,
    /// NUL bytes dropped before accumulation.
    pub nul_bytes_dropped: u64,
    /// Hook callbacks invoked.
    pub hooks_fired: u64,
}

impl DuplexStats {
    /// Commands resolved one way or another.
    #[must_use]
    pub const fn commands_resolved(&self) -> u64 {
        self.commands_matched + self.commands_timed_out + self.commands_aborted
    }

    /// Fraction of resolved commands that matched (0.0 to 1.0).
    ///
    /// Returns 1.0 if nothing has been resolved.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let resolved = self.commands_resolved();
        if resolved == 0 {
            1.0
        } else {
            self.commands_matched as f64 / resolved as f64
        }
    }
}
