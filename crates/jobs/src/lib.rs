#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `jobs` is the queue and job tree: a [`Job`](job::Job) is a user-visible
//! unit of work (open, cd, get, put, ls, mirror, ...), and a
//! [`JobQueue`](queue::JobQueue) owns a tree of them, admitting children into
//! a configurable number of concurrent slots, broadcasting signals to every
//! waiting job, and aggregating exit codes from children up to their parent.
//!
//! # Design
//!
//! - [`job::Job`] mirrors [`xfer_core::scheduler::Task`]'s step-until-done
//!   shape but reports completion through [`job::Job::done`] rather than a
//!   three-way status, since only [`job::Job::accept_sig`] ever needs to ask
//!   the queue to reap it early.
//! - [`queue::JobQueue`] drives every admitted job with
//!   [`queue::JobQueue::run_pass`] the way
//!   [`xfer_core::scheduler::Scheduler`] drives tasks, and keeps the tree
//!   itself (parent/child, foreground/background, exit-code aggregation)
//!   outside any individual job's own state.
//!
//! # Invariants
//!
//! - A job never disappears from its parent's children until it has
//!   finished and its exit code has been folded into the parent's
//!   aggregate via [`xfer_core::exit_code::JobExitCode::aggregate`].
//! - Terminal and process-group manipulation is not this crate's concern:
//!   [`job::Job::bg`]/[`job::Job::fg`] only flip bookkeeping: an embedding
//!   shell is responsible for the real session calls.

/// The `Job` trait and its step/done/signal/foreground contract.
pub mod job;
/// The job tree: concurrency admission, signal broadcast, exit aggregation.
pub mod queue;

pub use job::{DoStatus, Job};
pub use queue::{JobId, JobQueue};
