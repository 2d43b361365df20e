//! # Overview
//!
//! `glob` implements wildcard expansion: `*`, `?`, `[...]` with backslash
//! escapes, recognized the way POSIX `fnmatch(3)` recognizes them, plus the
//! tilde-handling rule a leading `~` follows ahead of expansion.
//!
//! # Design
//!
//! - [`fnmatch`] is the pure pattern matcher, parameterized by
//!   [`fnmatch::MatchFlags`] (pathname, period, casefold).
//! - [`tilde`] decides, ahead of any listing, whether a pattern's leading
//!   `~` should expand against the session's home or be rewritten literal.
//! - [`engine`] is the generic recursive glob: split at the last `/`, glob
//!   the directory prefix, list each candidate directory and filter its
//!   children. It is generic over [`engine::Entry`]/[`engine::DirLister`]
//!   so this crate has no dependency on a concrete listing implementation;
//!   `listing` depends on `glob`, not the other way around.
//!
//! Native globbing (submitting the pattern directly to a server that
//! accepts wildcards in `LIST`) needs no engine of its own — the caller
//! just sends `pattern` unchanged.
//!
//! # Invariants
//!
//! - Glob idempotence: a pattern with no wildcards returns exactly one
//!   synthetic entry named after the pattern, backslash-unquoted.

pub mod engine;
pub mod fnmatch;
pub mod tilde;

pub use engine::{DirLister, Entry, GlobOptions, recursive_glob};
pub use fnmatch::{MatchFlags, fnmatch, has_wildcards, unquote_wildcards};
pub use tilde::{TildeDecision, apply as apply_tilde, decide as decide_tilde};
