//! Restart (`REST`) bookkeeping and the per-host "don't bother" memoization.

use std::collections::HashSet;

/// Tracks restart-offset state for one session and remembers, per host,
/// that `REST` is pointless so later transfers skip straight to a full
/// re-transfer instead of re-probing.
#[derive(Debug, Default)]
pub struct RestartTracker {
    /// Offset most recently confirmed accepted by a `REST` command.
    last_rest: u64,
    /// Offset sent with the most recent `REST` command, pending its reply.
    rest_pos: u64,
    /// Hosts that have rejected `REST` and should not be asked again.
    no_rest_hosts: HashSet<String>,
}

impl RestartTracker {
    /// Creates a tracker with no restart history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether `host` is known to reject `REST`, from a previous
    /// session or an earlier command on this one.
    #[must_use]
    pub fn is_norest_host(&self, host: &str) -> bool {
        self.no_rest_hosts.contains(host)
    }

    /// Records that `host` rejected a `REST` command, so future transfers
    /// to it skip straight to a full re-transfer.
    pub fn mark_norest_host(&mut self, host: impl Into<String>) {
        self.no_rest_hosts.insert(host.into());
    }

    /// Records the offset about to be sent with a `REST` command.
    pub fn rest_sent(&mut self, offset: u64) {
        self.rest_pos = offset;
    }

    /// Records that the server accepted the most recently sent `REST`.
    pub fn rest_accepted(&mut self) {
        self.last_rest = self.rest_pos;
    }

    /// The last offset the server is known to have accepted.
    #[must_use]
    pub const fn last_accepted(&self) -> u64 {
        self.last_rest
    }

    /// The offset sent with the most recently issued `REST`, whether or not
    /// it has been confirmed yet.
    #[must_use]
    pub const fn pending(&self) -> u64 {
        self.rest_pos
    }
}
