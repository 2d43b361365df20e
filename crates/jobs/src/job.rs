//! The `Job` trait: a user-visible unit of work driven by a [`crate::queue::JobQueue`].

use xfer_core::exit_code::JobExitCode;
use xfer_core::scheduler::Status;

/// Outcome of a single [`Job::do_step`] call. Unlike the scheduler's
/// [`Status`], a job never asks to die from `do_step` alone — it reports
/// completion through [`Job::done`] instead, so a `Do()` that just finished
/// is still observed by the queue on the same pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DoStatus {
    /// No progress this call.
    Stall,
    /// Progress was made.
    Moved,
}

/// A user-visible unit of work: open, cd, get, put, ls, mirror, ... .
///
/// Implementations do the smallest unit of work per [`Job::do_step`] call
/// and report [`Job::done`] once finished; [`JobQueue`](crate::queue::JobQueue)
/// drives every job in its tree to quiescence the same way
/// [`xfer_core::scheduler::Scheduler`] drives tasks.
pub trait Job {
    /// Advances the job by one step.
    fn do_step(&mut self) -> DoStatus;

    /// Whether the job has finished (successfully or not).
    fn done(&self) -> bool;

    /// The job's own exit code, meaningful once [`Job::done`] is `true`.
    fn exit_code(&self) -> JobExitCode;

    /// Delivers a signal (conventionally `SIGINT`'s numeric value) to the
    /// job. Returning [`Status::WantDie`] tells the owning queue to reap
    /// this job immediately rather than wait for [`Job::done`].
    fn accept_sig(&mut self, _signum: i32) -> Status {
        Status::Stall
    }

    /// Moves the job to the background: it no longer expects to control a
    /// terminal. Actual process-group/terminal manipulation is the
    /// embedding shell's responsibility; this only updates the job's own
    /// bookkeeping.
    fn bg(&mut self) {}

    /// Moves the job back to the foreground.
    fn fg(&mut self) {}

    /// Writes a one-line run-status summary (progress, rate, ETA) to `out`.
    fn show_run_status(&self, out: &mut dyn std::fmt::Write) {
        let _ = out;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{DoStatus, Job, JobExitCode, Status};

    /// A job that finishes after a fixed number of `do_step` calls.
    pub struct Countdown {
        pub remaining: u32,
        pub code: JobExitCode,
        pub background: bool,
    }

    impl Job for Countdown {
        fn do_step(&mut self) -> DoStatus {
            if self.remaining == 0 {
                return DoStatus::Stall;
            }
            self.remaining -= 1;
            DoStatus::Moved
        }

        fn done(&self) -> bool {
            self.remaining == 0
        }

        fn exit_code(&self) -> JobExitCode {
            self.code
        }

        fn bg(&mut self) {
            self.background = true;
        }

        fn fg(&mut self) {
            self.background = false;
        }
    }

    /// A job that never finishes on its own but dies when signaled.
    pub struct Stubborn {
        pub dies_on_sig: bool,
    }

    impl Job for Stubborn {
        fn do_step(&mut self) -> DoStatus {
            DoStatus::Stall
        }

        fn done(&self) -> bool {
            false
        }

        fn exit_code(&self) -> JobExitCode {
            JobExitCode::Aborted
        }

        fn accept_sig(&mut self, signum: i32) -> Status {
            if signum == 2 && self.dies_on_sig {
                Status::WantDie
            } else {
                Status::Stall
            }
        }
    }
}
