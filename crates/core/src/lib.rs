#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `xfer_core` hosts the facilities every other crate in the workspace leans
//! on: the cooperative task [`scheduler`], the [`timer`] registry it drives,
//! user-visible diagnostic [`message`] formatting, canonical [`exit_code`]s,
//! and the [`config`] abstraction over the external resource store.
//!
//! # Design
//!
//! - [`scheduler::Scheduler`] owns every [`scheduler::Task`] in a `slab`-backed
//!   arena and drives them with repeated `step()` calls until a fixed point is
//!   reached for a given iteration (see [`scheduler`] for the exact algorithm).
//! - [`timer::Timer`] wraps a single-shot deadline; the scheduler asks the
//!   timer registry for the minimum pending deadline on every iteration.
//! - [`message::Message`] centralises how a subsystem (session, transfer,
//!   lister, ...) renders a user-visible diagnostic, including severity,
//!   originating [`message::Role`], and source location.
//! - [`config::ResourceStore`] models the external key/closure configuration
//!   collaborator; [`config::StaticResourceStore`] and
//!   [`config::EnvResourceStore`] are the concrete, testable stand-ins used by
//!   the test suite and simple embeddings.
//!
//! # Invariants
//!
//! - No task is ever dropped while its `step()` is on the call stack (see
//!   [`scheduler`] for the enter/leave guard that enforces this).
//! - [`timer::Timer::stopped`] is monotonic: once true for a given `now`, it
//!   stays true for any later `now`.
//!
//! # See also
//!
//! - [`crate::scheduler`] for the full cooperative scheduling algorithm.
//! - [`crate::config`] for the duration/rate parsing grammar shared with the
//!   sibling `bandwidth` crate.

/// Exit and step status codes shared across the workspace.
pub mod exit_code;
/// User-visible diagnostic formatting.
pub mod message;
/// Version banner shared by the CLI and test harnesses.
pub mod version;

/// Resource-store abstraction and textual duration/rate parsing.
pub mod config;
/// Cooperative task scheduler.
pub mod scheduler;
/// Timer registry built on top of the scheduler.
pub mod timer;
