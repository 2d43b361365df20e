//! Cooperative task scheduler.
//!
//! Every long-lived piece of work in the workspace — a control-protocol
//! session, a data-channel negotiation, a transfer, the resolver — is a
//! [`Task`] owned by a [`Scheduler`] in a `slab`-backed arena rather than an
//! OS thread. [`Scheduler::run_to_fixed_point`] repeatedly calls `step()` on
//! every runnable task until a full pass leaves every task [`Status::Stall`],
//! then [`Scheduler::collect_garbage`] drops tasks that asked to die and have
//! no outstanding references. This mirrors driving a single-threaded reactor
//! to quiescence once per I/O wakeup instead of each task blocking its own
//! thread.

use std::io;
use std::time::{Duration, Instant};

use slab::Slab;

/// Opaque handle to a task owned by a [`Scheduler`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TaskId(usize);

/// Result of a single [`Task::step`] call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// The task made no progress this call; it is waiting on external input.
    Stall,
    /// The task made progress; the scheduler should give every task another pass.
    Moved,
    /// The task is done and asks to be deleted once nothing still references it.
    WantDie,
}

impl Status {
    /// Combines two statuses from the same pass the way upstream treats
    /// `STALL|MOVED == MOVED`: any `Moved` in a pass means the whole pass
    /// moved.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::WantDie, _) | (_, Self::WantDie) => Self::WantDie,
            (Self::Moved, _) | (_, Self::Moved) => Self::Moved,
            (Self::Stall, Self::Stall) => Self::Stall,
        }
    }
}

/// A unit of cooperatively scheduled work.
///
/// Implementations should do the smallest amount of work that makes
/// progress and return promptly; a `step()` that blocks stalls every other
/// task in the scheduler.
pub trait Task {
    /// Advances the task by one step, returning whether it made progress.
    fn step(&mut self) -> Status;

    /// Re-reads configuration for this task. `name` narrows the
    /// reconfiguration to a single changed key; `None` means "reload
    /// everything".
    fn reconfigure(&mut self, _name: Option<&str>) {}

    /// A short description used in diagnostics (a session's remote host, a
    /// transfer's file name). `None` if the task has no useful context yet.
    fn log_context(&self) -> Option<&str> {
        None
    }
}

struct Slot {
    task: Box<dyn Task>,
    ref_count: u32,
    deleting: bool,
    suspended: bool,
    suspended_slave: bool,
}

/// Owns every [`Task`] in the process and drives them to quiescence.
///
/// # Invariants
///
/// - A task is never dropped while it is on the [`Scheduler::enter`]/
///   [`Scheduler::leave`] stack, even if [`Scheduler::delete_later`] marked
///   it for deletion and its reference count reached zero in the meantime;
///   [`Scheduler::collect_garbage`] skips any id still on the stack.
/// - [`Scheduler::is_suspended`] is the logical OR of a task's own suspend
///   flag and its slave-suspend flag, so a master task's
///   [`Scheduler::suspend_slaves`] call composes with a direct
///   [`Scheduler::suspend`] from the task's own owner.
#[derive(Default)]
pub struct Scheduler {
    slots: Slab<Slot>,
    stack: Vec<TaskId>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Slab::new(),
            stack: Vec::new(),
        }
    }

    /// Registers a task and returns its handle, with a reference count of `1`.
    pub fn insert(&mut self, task: impl Task + 'static) -> TaskId {
        let key = self.slots.insert(Slot {
            task: Box::new(task),
            ref_count: 1,
            deleting: false,
            suspended: false,
            suspended_slave: false,
        });
        TaskId(key)
    }

    /// Increments a task's reference count, mirroring upstream `MakeRef`.
    pub fn make_ref(&mut self, id: TaskId) -> TaskId {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.ref_count += 1;
        }
        id
    }

    /// Decrements a task's reference count and collects it immediately if it
    /// has already asked to die, mirroring upstream `DeleteRef`.
    pub fn delete_ref(&mut self, id: TaskId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.ref_count = slot.ref_count.saturating_sub(1);
        }
        self.collect_one(id);
    }

    /// Marks a task for deletion once its reference count reaches zero and
    /// it is off the enter/leave stack.
    pub fn delete_later(&mut self, id: TaskId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.deleting = true;
        }
        self.collect_one(id);
    }

    fn collect_one(&mut self, id: TaskId) {
        let on_stack = self.stack.contains(&id);
        if on_stack {
            return;
        }
        let should_remove = self
            .slots
            .get(id.0)
            .is_some_and(|slot| slot.deleting && slot.ref_count == 0);
        if should_remove {
            self.slots.remove(id.0);
        }
    }

    /// Sweeps every task marked for deletion with no remaining references
    /// and not on the call stack, returning how many were removed.
    pub fn collect_garbage(&mut self) -> usize {
        let dead: Vec<TaskId> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.deleting && slot.ref_count == 0)
            .map(|(key, _)| TaskId(key))
            .filter(|id| !self.stack.contains(id))
            .collect();
        let count = dead.len();
        for id in dead {
            self.slots.remove(id.0);
        }
        count
    }

    /// Suspends a task: its `step()` is skipped by
    /// [`Scheduler::run_to_fixed_point`] until [`Scheduler::resume`].
    pub fn suspend(&mut self, id: TaskId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.suspended = true;
        }
    }

    /// Resumes a task suspended with [`Scheduler::suspend`].
    pub fn resume(&mut self, id: TaskId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.suspended = false;
        }
    }

    /// Suspends a task via the slave flag, used by a master task to pause
    /// tasks it owns without touching their own suspend state.
    pub fn suspend_slave(&mut self, id: TaskId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.suspended_slave = true;
        }
    }

    /// Resumes a task's slave-suspend flag.
    pub fn resume_slave(&mut self, id: TaskId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.suspended_slave = false;
        }
    }

    /// Reports whether a task is suspended, directly or as a slave.
    #[must_use]
    pub fn is_suspended(&self, id: TaskId) -> bool {
        self.slots
            .get(id.0)
            .is_some_and(|slot| slot.suspended || slot.suspended_slave)
    }

    /// The number of tasks currently registered, including suspended ones.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.slots.len()
    }

    /// Pushes `id` onto the enter/leave stack, protecting it from
    /// [`Scheduler::collect_garbage`] while it runs.
    pub fn enter(&mut self, id: TaskId) {
        self.stack.push(id);
    }

    /// Pops the top of the enter/leave stack.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not the task on top of the stack; callers must
    /// nest `enter`/`leave` pairs strictly.
    pub fn leave(&mut self, id: TaskId) {
        let top = self.stack.pop();
        assert_eq!(top, Some(id), "Scheduler::leave called out of order");
    }

    /// Steps a single task to a fixed point: calls `step()` repeatedly while
    /// it keeps returning [`Status::Moved`], then returns its final status.
    /// Mirrors upstream `SMTask::Roll`.
    pub fn roll(&mut self, id: TaskId) -> Status {
        self.enter(id);
        let mut last = Status::Stall;
        loop {
            let Some(slot) = self.slots.get_mut(id.0) else {
                break;
            };
            if slot.suspended || slot.suspended_slave {
                break;
            }
            let status = slot.task.step();
            last = last.combine(status);
            if !matches!(status, Status::Moved) {
                break;
            }
        }
        self.leave(id);
        self.collect_one(id);
        last
    }

    /// Drives every non-suspended task through one full pass, returning
    /// `true` if any task reported [`Status::Moved`].
    fn pass(&mut self) -> bool {
        let ids: Vec<TaskId> = self.slots.iter().map(|(key, _)| TaskId(key)).collect();
        let mut moved = false;
        for id in ids {
            let skip = self
                .slots
                .get(id.0)
                .is_none_or(|slot| slot.suspended || slot.suspended_slave);
            if skip {
                continue;
            }
            self.enter(id);
            let status = self.slots.get_mut(id.0).map(|slot| slot.task.step());
            self.leave(id);
            match status {
                Some(Status::Moved) => moved = true,
                Some(Status::WantDie) => {
                    self.delete_later(id);
                    moved = true;
                }
                _ => {}
            }
        }
        moved
    }

    /// Drives every task until a full pass makes no further progress, then
    /// collects garbage. Mirrors upstream `SMTask::Schedule` followed by
    /// `CollectGarbage`, repeated to a fixed point.
    pub fn run_to_fixed_point(&mut self) {
        while self.pass() {
            self.collect_garbage();
        }
        self.collect_garbage();
    }

    /// Runs [`Scheduler::run_to_fixed_point`] repeatedly for up to `budget`,
    /// for use in an outer poll loop that must also service a timeout.
    /// Mirrors upstream `SMTask::RollAll(const TimeInterval &max_time)`.
    pub fn run_for(&mut self, budget: Duration) {
        let deadline = Instant::now() + budget;
        loop {
            self.run_to_fixed_point();
            if Instant::now() >= deadline {
                break;
            }
            if !self.pass() {
                break;
            }
        }
    }

    /// Reconfigures every registered task, mirroring upstream `ReconfigAll`.
    pub fn reconfigure_all(&mut self, name: Option<&str>) {
        for (_, slot) in self.slots.iter_mut() {
            slot.task.reconfigure(name);
        }
    }
}

/// Classifies an I/O error as non-fatal: one that a cooperative task can
/// retry on its next scheduler pass rather than surface as a hard failure.
#[must_use]
pub fn is_non_fatal_error(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Classifies an I/O error as a transient network condition worth
/// reconnecting and retrying rather than aborting the job.
#[must_use]
pub fn is_temporary_network_error(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
    )
}
