//! Timer registry built on top of the scheduler.
//!
//! A [`Timer`] is a single-shot deadline a task checks with
//! [`Timer::stopped`] instead of blocking; [`TimerRegistry`] collects every
//! timer a task cares about so an outer poll loop can ask
//! [`TimerRegistry::next_deadline`] for how long it may safely block before
//! the [`crate::scheduler::Scheduler`] needs another pass.

use std::time::{Duration, Instant};

use slab::Slab;

use crate::config::{ConfigError, ResourceStore};

/// Opaque handle to a timer owned by a [`TimerRegistry`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TimerId(usize);

/// A single-shot deadline, optionally bound to a named configuration
/// resource so [`Timer::reconfigure`] can re-read its duration.
#[derive(Clone, Debug)]
pub struct Timer {
    start: Instant,
    duration: Duration,
    last_setting: Duration,
    resource: Option<(&'static str, Option<String>)>,
}

impl Timer {
    /// Creates a timer that is already stopped (zero duration).
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            duration: Duration::ZERO,
            last_setting: Duration::ZERO,
            resource: None,
        }
    }

    /// Creates a timer set to fire after `duration` from now.
    #[must_use]
    pub fn with_duration(duration: Duration) -> Self {
        let mut timer = Self::new();
        timer.set(duration);
        timer
    }

    /// (Re)starts the timer: the deadline becomes `now + duration`.
    pub fn set(&mut self, duration: Duration) {
        self.start = Instant::now();
        self.duration = duration;
        self.last_setting = duration;
    }

    /// Convenience constructor/setter for a millisecond duration.
    pub fn set_millis(&mut self, ms: u64) {
        self.set(Duration::from_millis(ms));
    }

    /// Binds this timer to a named resource so later calls to
    /// [`Timer::reconfigure`] matching `name` (or `None`) re-read the
    /// duration from the store.
    pub fn set_resource(&mut self, name: &'static str, closure: Option<&str>) {
        self.resource = Some((name, closure.map(str::to_string)));
    }

    /// Restarts the timer with its last-applied duration, without touching
    /// the resource binding.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    /// Reports whether the deadline has passed.
    #[must_use]
    pub fn stopped(&self) -> bool {
        self.time_left() == Duration::ZERO
    }

    /// Time remaining until the deadline, or `Duration::ZERO` if it has
    /// already passed.
    #[must_use]
    pub fn time_left(&self) -> Duration {
        let elapsed = self.start.elapsed();
        self.duration.saturating_sub(elapsed)
    }

    /// The duration this timer was last set or reconfigured to.
    #[must_use]
    pub const fn last_setting(&self) -> Duration {
        self.last_setting
    }

    /// Re-reads this timer's duration from `store` if it is bound to a
    /// resource and `name` is `None` or matches that resource's name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the stored value doesn't parse as a
    /// duration.
    pub fn reconfigure(
        &mut self,
        store: &dyn ResourceStore,
        name: Option<&str>,
    ) -> Result<(), ConfigError> {
        let Some((resource, closure)) = &self.resource else {
            return Ok(());
        };
        if let Some(changed) = name {
            if changed != *resource {
                return Ok(());
            }
        }
        if let Some(duration) = store.query_duration(resource, closure.as_deref())? {
            self.set(duration);
        }
        Ok(())
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns a set of [`Timer`]s so an outer poll loop can compute the minimum
/// remaining deadline across all of them in one call.
#[derive(Default)]
pub struct TimerRegistry {
    timers: Slab<Timer>,
}

impl TimerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { timers: Slab::new() }
    }

    /// Registers a timer and returns its handle.
    pub fn insert(&mut self, timer: Timer) -> TimerId {
        TimerId(self.timers.insert(timer))
    }

    /// Removes a timer from the registry.
    pub fn remove(&mut self, id: TimerId) {
        if self.timers.contains(id.0) {
            self.timers.remove(id.0);
        }
    }

    /// Returns a reference to a timer, if still registered.
    #[must_use]
    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(id.0)
    }

    /// Returns a mutable reference to a timer, if still registered.
    pub fn get_mut(&mut self, id: TimerId) -> Option<&mut Timer> {
        self.timers.get_mut(id.0)
    }

    /// The shortest remaining deadline across every registered timer, or
    /// `None` if the registry is empty. An outer poll loop can pass this
    /// straight to its `poll`/`select` timeout.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|(_, timer)| timer.time_left()).min()
    }

    /// Re-reads every registered timer's duration via
    /// [`Timer::reconfigure`], mirroring upstream `SMTask::ReconfigAll`
    /// applied to the subset of tasks that are timers.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered; timers after the
    /// failing one are left unreconfigured.
    pub fn reconfigure_all(
        &mut self,
        store: &dyn ResourceStore,
        name: Option<&str>,
    ) -> Result<(), ConfigError> {
        for (_, timer) in self.timers.iter_mut() {
            timer.reconfigure(store, name)?;
        }
        Ok(())
    }
}
