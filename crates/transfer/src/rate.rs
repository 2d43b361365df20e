//! Per-transfer and process-wide rate limiting.
//!
//! Grounded on the original's `RateLimit`/`BytesPool` pair: every transfer
//! paces itself against its own direction's limit (`net:limit-rate`) and,
//! if one is configured, a second pool shared by every transfer in the
//! process (`net:limit-total-rate`). Unlike the original's non-blocking
//! `BytesAllowed`/`BytesUsed` query, pacing here is delegated to
//! [`bandwidth::BandwidthLimiter`], which sleeps directly; [`RateLimiter`]
//! only decides how large a chunk to request and forwards the byte count
//! to both pools once it has actually moved.

use std::cell::RefCell;
use std::num::NonZeroU64;
use std::rc::Rc;

use bandwidth::BandwidthLimiter;

/// A process-wide rate pool, shared by every transfer that should draw from
/// the same `net:limit-total-rate` budget.
pub type SharedLimiter = Rc<RefCell<BandwidthLimiter>>;

/// Combines a transfer's own direction limit with an optional shared total
/// pool, mirroring the original's per-task `one[dir]` plus static `total[dir]`.
#[derive(Default)]
pub struct RateLimiter {
    one: Option<BandwidthLimiter>,
    total: Option<SharedLimiter>,
}

impl RateLimiter {
    /// Creates a limiter with no bound configured; [`RateLimiter::recommended_chunk`]
    /// then returns `buffer_len` unchanged and [`RateLimiter::register`] is a no-op.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Sets this transfer's own direction limit.
    pub fn set_direction_limit(&mut self, limit: Option<NonZeroU64>) {
        self.one = limit.map(BandwidthLimiter::new);
    }

    /// Attaches a process-wide pool shared with other transfers.
    pub fn set_total_pool(&mut self, total: Option<SharedLimiter>) {
        self.total = total;
    }

    /// The largest chunk this step should move, bounded by whichever of the
    /// two pools is tighter.
    #[must_use]
    pub fn recommended_chunk(&self, buffer_len: usize) -> usize {
        let mut max = buffer_len;
        if let Some(one) = &self.one {
            max = max.min(one.recommended_read_size(buffer_len));
        }
        if let Some(total) = &self.total {
            max = max.min(total.borrow().recommended_read_size(buffer_len));
        }
        max
    }

    /// Reports `bytes` moved to both pools, pacing as each pool requires.
    pub fn register(&mut self, bytes: usize) {
        if bytes == 0 {
            return;
        }
        if let Some(one) = &mut self.one {
            let _ = one.register(bytes);
        }
        if let Some(total) = &self.total {
            let _ = total.borrow_mut().register(bytes);
        }
    }
}
