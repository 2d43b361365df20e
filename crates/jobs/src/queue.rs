//! The job tree: parent/child relationships, a per-group concurrency cap,
//! `SIGINT` propagation to every waiting child, and worst-code exit
//! aggregation up the tree.

use std::collections::HashMap;

use xfer_core::exit_code::JobExitCode;
use xfer_core::scheduler::Status;

use crate::job::{DoStatus, Job};

/// Opaque handle to a job owned by a [`JobQueue`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct JobId(u64);

struct Entry {
    job: Box<dyn Job>,
    parent: Option<JobId>,
    children: Vec<JobId>,
    foreground: bool,
    started: bool,
    finished: bool,
    aggregated_children_exit: JobExitCode,
    #[allow(dead_code)]
    cmdline: String,
}

/// Owns a tree of [`Job`]s, admitting up to a configurable number of
/// concurrent children per parent (the "parallel slots" the shell exposes),
/// propagating signals to every still-waiting job, and aggregating exit
/// codes from children up to their parent as each finishes.
pub struct JobQueue {
    entries: HashMap<u64, Entry>,
    order: Vec<JobId>,
    next_jobno: u64,
    max_concurrent: usize,
}

impl JobQueue {
    /// Creates a queue. `max_concurrent` of `0` means unlimited parallel
    /// children per parent.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            next_jobno: 1,
            max_concurrent,
        }
    }

    /// Registers `job` as a child of `parent` (`None` for a top-level,
    /// foreground-by-default job) with the given command line, and returns
    /// its handle.
    pub fn spawn(&mut self, job: Box<dyn Job>, parent: Option<JobId>, cmdline: impl Into<String>) -> JobId {
        let id = JobId(self.next_jobno);
        self.next_jobno += 1;
        self.entries.insert(
            id.0,
            Entry {
                job,
                parent,
                children: Vec::new(),
                foreground: parent.is_none(),
                started: false,
                finished: false,
                aggregated_children_exit: JobExitCode::Success,
                cmdline: cmdline.into(),
            },
        );
        self.order.push(id);
        if let Some(parent_id) = parent {
            if let Some(parent_entry) = self.entries.get_mut(&parent_id.0) {
                parent_entry.children.push(id);
            }
        }
        id
    }

    fn active_siblings(&self, parent: Option<JobId>) -> usize {
        self.order
            .iter()
            .filter(|id| {
                let e = &self.entries[&id.0];
                e.parent == parent && e.started && !e.finished
            })
            .count()
    }

    fn admit(&mut self) {
        let candidates: Vec<JobId> = self
            .order
            .iter()
            .copied()
            .filter(|id| {
                let e = &self.entries[&id.0];
                !e.started && !e.finished
            })
            .collect();
        for id in candidates {
            let parent = self.entries[&id.0].parent;
            if self.max_concurrent == 0 || self.active_siblings(parent) < self.max_concurrent {
                self.entries.get_mut(&id.0).unwrap().started = true;
            }
        }
    }

    fn finish(&mut self, id: JobId) {
        let Some(entry) = self.entries.get_mut(&id.0) else {
            return;
        };
        if entry.finished {
            return;
        }
        entry.finished = true;
        let code = entry.job.exit_code();
        let parent = entry.parent;
        if let Some(parent_id) = parent {
            if let Some(parent_entry) = self.entries.get_mut(&parent_id.0) {
                parent_entry.aggregated_children_exit =
                    parent_entry.aggregated_children_exit.aggregate(code);
                parent_entry.children.retain(|child| *child != id);
            }
        }
    }

    /// Admits queued jobs into free concurrency slots, then steps every
    /// admitted, unfinished job once. Returns whether any job reported
    /// progress.
    pub fn run_pass(&mut self) -> bool {
        self.admit();
        let runnable: Vec<JobId> = self
            .order
            .iter()
            .copied()
            .filter(|id| {
                let e = &self.entries[&id.0];
                e.started && !e.finished
            })
            .collect();

        let mut moved = false;
        for id in runnable {
            let status = self.entries.get_mut(&id.0).unwrap().job.do_step();
            if matches!(status, DoStatus::Moved) {
                moved = true;
            }
            if self.entries[&id.0].job.done() {
                self.finish(id);
            }
        }
        moved
    }

    /// Runs [`JobQueue::run_pass`] until a full pass makes no progress.
    pub fn run_to_fixed_point(&mut self) {
        while self.run_pass() {}
    }

    /// Delivers `signum` to every job that hasn't finished yet. A job
    /// replying [`Status::WantDie`] is reaped immediately; its id is
    /// included in the returned list.
    pub fn broadcast_sig(&mut self, signum: i32) -> Vec<JobId> {
        let waiting: Vec<JobId> = self
            .order
            .iter()
            .copied()
            .filter(|id| !self.entries[&id.0].finished)
            .collect();

        let mut died = Vec::new();
        for id in waiting {
            let status = self.entries.get_mut(&id.0).unwrap().job.accept_sig(signum);
            if matches!(status, Status::WantDie) {
                self.finish(id);
                died.push(id);
            }
        }
        died
    }

    /// Whether `id`'s job has finished.
    #[must_use]
    pub fn is_finished(&self, id: JobId) -> bool {
        self.entries.get(&id.0).is_some_and(|e| e.finished)
    }

    /// `id`'s own exit code aggregated with the worst code any of its
    /// children finished with.
    #[must_use]
    pub fn exit_code(&self, id: JobId) -> JobExitCode {
        self.entries
            .get(&id.0)
            .map_or(JobExitCode::Success, |e| e.job.exit_code().aggregate(e.aggregated_children_exit))
    }

    /// Whether `id` currently controls the terminal.
    #[must_use]
    pub fn is_foreground(&self, id: JobId) -> bool {
        self.entries.get(&id.0).is_some_and(|e| e.foreground)
    }

    /// Moves `id` to the background.
    pub fn set_background(&mut self, id: JobId) {
        if let Some(entry) = self.entries.get_mut(&id.0) {
            entry.foreground = false;
            entry.job.bg();
        }
    }

    /// Moves `id` to the foreground.
    pub fn set_foreground(&mut self, id: JobId) {
        if let Some(entry) = self.entries.get_mut(&id.0) {
            entry.foreground = true;
            entry.job.fg();
        }
    }

    /// The ids of `id`'s children still waiting (not yet finished).
    #[must_use]
    pub fn waiting_children(&self, id: JobId) -> Vec<JobId> {
        self.entries.get(&id.0).map(|e| e.children.clone()).unwrap_or_default()
    }

    /// Writes `id`'s run-status line to `out`.
    pub fn show_run_status(&self, id: JobId, out: &mut dyn std::fmt::Write) {
        if let Some(entry) = self.entries.get(&id.0) {
            entry.job.show_run_status(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::test_support::{Countdown, Stubborn};

    #[test]
    fn a_parent_waits_for_its_child_and_aggregates_its_exit_code() {
        let mut queue = JobQueue::new(0);
        let parent = queue.spawn(
            Box::new(Countdown { remaining: 0, code: JobExitCode::Success, background: false }),
            None,
            "mirror",
        );
        let child = queue.spawn(
            Box::new(Countdown { remaining: 2, code: JobExitCode::Partial, background: false }),
            Some(parent),
            "get file",
        );

        queue.run_to_fixed_point();

        assert!(queue.is_finished(child));
        assert!(queue.is_finished(parent));
        assert_eq!(queue.exit_code(parent), JobExitCode::Partial);
    }

    #[test]
    fn concurrency_cap_limits_simultaneously_active_children() {
        let mut queue = JobQueue::new(1);
        let parent = queue.spawn(
            Box::new(Countdown { remaining: 100, code: JobExitCode::Success, background: false }),
            None,
            "queue",
        );
        let a = queue.spawn(
            Box::new(Countdown { remaining: 3, code: JobExitCode::Success, background: false }),
            Some(parent),
            "a",
        );
        let b = queue.spawn(
            Box::new(Countdown { remaining: 3, code: JobExitCode::Success, background: false }),
            Some(parent),
            "b",
        );

        queue.run_pass();
        // With a cap of one, only the first-spawned sibling is admitted on the first pass.
        assert!(queue.entries[&a.0].started);
        assert!(!queue.entries[&b.0].started);
    }

    #[test]
    fn sigint_reaps_a_job_that_wants_to_die() {
        let mut queue = JobQueue::new(0);
        let stubborn = queue.spawn(Box::new(Stubborn { dies_on_sig: true }), None, "stubborn");
        let patient = queue.spawn(Box::new(Stubborn { dies_on_sig: false }), None, "patient");

        let died = queue.broadcast_sig(2);

        assert_eq!(died, vec![stubborn]);
        assert!(queue.is_finished(stubborn));
        assert!(!queue.is_finished(patient));
    }

    #[test]
    fn background_and_foreground_toggle_the_job_and_its_flag() {
        let mut queue = JobQueue::new(0);
        let id = queue.spawn(
            Box::new(Countdown { remaining: 5, code: JobExitCode::Success, background: false }),
            None,
            "get big.iso",
        );
        assert!(queue.is_foreground(id));

        queue.set_background(id);
        assert!(!queue.is_foreground(id));

        queue.set_foreground(id);
        assert!(queue.is_foreground(id));
    }
}
