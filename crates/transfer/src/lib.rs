#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `transfer` is the copy engine that moves bytes between a source and a
//! destination endpoint: a growable staging buffer, ASCII/binary line-ending
//! translation, two-pool rate limiting, restart-on-failure backoff, and an
//! optional post-transfer checksum verify.
//!
//! # Design
//!
//! - [`engine::CopyEngine`] is the driveable [`xfer_core::scheduler::Task`]:
//!   it pulls from a [`engine::Source`], translates through an
//!   [`io::Translator`], and drains to a [`engine::Sink`], pacing itself with
//!   [`rate::RateLimiter`].
//! - [`translate::EolTranslator`] implements the CRLF injection/stripping
//!   `io::Translator` ASCII mode needs, with the boundary-CR deferral the
//!   wire format requires.
//! - [`restart::RestartPolicy`] computes the backoff delay and attempt
//!   budget for a retriable source failure; [`restart::destination_restart`]
//!   decides whether the destination resumes at an offset or truncates.
//! - [`verify::Verifier`] streams one of `checksums::strong`'s digests over
//!   the bytes written, for a job that asks for post-transfer verification.
//!
//! # Invariants
//!
//! - [`engine::CopyEngine::step`] never blocks: a source or sink not ready
//!   yields a stall rather than waiting, matching the workspace's
//!   cooperative scheduling contract.
//! - [`engine::CopyEngine::confirmed_offset`] counts only bytes the
//!   destination has accepted, never bytes sitting in the staging buffer —
//!   that's what a restart resumes from.
//!
//! # See also
//!
//! - `bandwidth`'s own module docs, which describe the two-pool limiter this
//!   crate's [`rate::RateLimiter`] wraps.
//! - `checksums::strong` for the digest algorithms [`verify::Verifier`] picks from.

/// The staging-buffer copy engine and its `Source`/`Sink` seams.
pub mod engine;
/// Errors the engine surfaces.
pub mod error;
/// Per-transfer and process-wide rate limiting.
pub mod rate;
/// Restart-on-failure backoff policy.
pub mod restart;
/// ASCII-mode line-ending translation.
pub mod translate;
/// Post-transfer checksum verification.
pub mod verify;

pub use engine::{CopyEngine, ReadOutcome, Sink, Source};
pub use error::TransferError;
pub use rate::{RateLimiter, SharedLimiter};
pub use restart::{destination_restart, DestinationRestart, RestartPolicy};
pub use translate::{AsciiMode, EolTranslator};
pub use verify::Verifier;
