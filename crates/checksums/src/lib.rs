#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the whole-file digest algorithms used by the
//! transfer engine's verify phase: after a copy job finishes, it can hash
//! both ends and compare, catching corruption that a size/timestamp check
//! alone would miss.
//!
//! # Design
//!
//! [`strong`] exposes MD5, SHA-1, SHA-256, SHA-512, and XXH64 behind the
//! common [`strong::StrongDigest`] trait, plus [`strong::VerifyAlgorithm`]
//! as the enum a transfer job configuration picks by name.
//!
//! # Invariants
//!
//! - Every digest streams incrementally and never panics; failures surface
//!   through the standard digest traits, not process aborts.
//!
//! # Examples
//!
//! ```
//! use checksums::strong::VerifyAlgorithm;
//!
//! let digest = VerifyAlgorithm::Sha256.hex_digest(b"file contents");
//! assert_eq!(digest.len(), 64);
//! ```

/// Whole-file digest algorithms for the transfer verify phase.
pub mod strong;
