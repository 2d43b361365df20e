//! # Overview
//!
//! `protocol` implements the control-protocol session: the line-oriented,
//! reply-driven state machine used to talk to an FTP-style server, plus the
//! data-channel negotiator that decides how the matching data connection is
//! established. It owns the wire-level contracts that must be bit-exact —
//! multi-line reply framing, `PASV`/`EPSV`/`PORT`/`EPRT` address encoding,
//! `FEAT` parsing — and the session bookkeeping (restart offsets, feature
//! flags, the pipelined reply queue) that those contracts feed.
//!
//! # Design
//!
//! - [`state`] defines [`state::SessionState`], the coarse state machine
//!   (`Initial → Connecting → ... → Eof`) and which forward transitions are
//!   legal.
//! - [`reply`] decodes raw control-connection lines into [`reply::Reply`]
//!   values, handling RFC 959 multi-line framing, and classifies reply
//!   codes into [`reply::ReplyClass`].
//! - [`response_queue`] is the FIFO of [`response_queue::ExpectedResponse`]
//!   entries a session keeps so pipelined replies are always matched to the
//!   command that produced them, in order.
//! - [`data_channel`] decodes/encodes `PASV`, `EPSV`, `PORT`, and `EPRT`
//!   addresses and implements the address-fixup security check.
//! - [`features`] tracks the monotonic [`features::FeatureSet`] discovered
//!   via `FEAT`.
//! - [`restart`] tracks `REST` offsets and per-host "don't bother"
//!   memoization once a host is known to reject restarts.
//! - [`secure`] is the [`secure::SecureChannel`] seam for `AUTH TLS`/`PROT`
//!   upgrades, with [`secure::NullSecureChannel`] as a plaintext/test
//!   double.
//! - [`session`] ties all of the above into [`session::Session`], a
//!   [`xfer_core::scheduler::Task`] driven by feeding it complete lines off
//!   the control connection and draining queued outgoing commands.
//!
//! # Invariants
//!
//! - Replies are matched to outstanding commands strictly in submission
//!   order (reply FIFO); a session never reorders the queue.
//! - [`features::FeatureSet::merge`] only ever sets bits, never clears them
//!   (feature monotonicity).
//! - `530` replies are reclassified as transient only when their text
//!   matches a known "try again" pattern; every other classification is
//!   purely a function of the reply code's leading digit.
//!
//! # See also
//!
//! - `xfer-core`'s `scheduler` and `message` modules, which this crate's
//!   [`session::Session`] is built on.
//! - `transfer`, which drives a [`session::Session`] through a file copy
//!   once a data channel is open.

pub mod data_channel;
pub mod error;
pub mod features;
pub mod reply;
pub mod response_queue;
pub mod restart;
pub mod secure;
pub mod session;
pub mod state;

pub use error::{DataChannelError, ReplyError};
pub use reply::{Reply, ReplyClass, ReplyParser};
pub use response_queue::{CheckCase, ExpectedResponse, ResponseQueue};
pub use session::Session;
pub use state::SessionState;
