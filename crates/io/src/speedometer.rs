//! Transfer-rate smoothing for progress display.

use std::time::{Duration, Instant};

/// Exponentially-decaying transfer-rate estimate, the same shape used to
/// render a `123.4 KiB/s` progress indicator.
///
/// Samples are folded in with [`Speedometer::add`]; [`Speedometer::rate`]
/// blends the running average with time elapsed since the last sample so
/// the displayed rate decays toward zero if no bytes arrive for a while
/// instead of freezing at the last active value.
pub struct Speedometer {
    period: Duration,
    last_sample: Instant,
    bytes_since_sample: u64,
    rate: f64,
}

impl Speedometer {
    /// Creates a speedometer that averages over `period`.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_sample: Instant::now(),
            bytes_since_sample: 0,
            rate: 0.0,
        }
    }

    /// Records that `n` bytes were transferred just now.
    pub fn add(&mut self, n: usize) {
        self.bytes_since_sample += n as u64;
        self.maybe_roll();
    }

    fn maybe_roll(&mut self) {
        let elapsed = self.last_sample.elapsed();
        if elapsed < self.period {
            return;
        }
        let instantaneous = self.bytes_since_sample as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        // exponential decay: half weight to the new sample, half to history.
        self.rate = if self.rate == 0.0 {
            instantaneous
        } else {
            (self.rate + instantaneous) / 2.0
        };
        self.bytes_since_sample = 0;
        self.last_sample = Instant::now();
    }

    /// The current smoothed rate in bytes/second. Decays toward zero if no
    /// samples have arrived for longer than the averaging period.
    #[must_use]
    pub fn rate(&mut self) -> f64 {
        self.maybe_roll();
        if self.last_sample.elapsed() > self.period * 4 {
            self.rate = 0.0;
        }
        self.rate
    }
}
