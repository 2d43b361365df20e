//! Errors surfaced by the copy engine.

use thiserror::Error;
use xfer_core::exit_code::{HasResultCode, JobExitCode, ResultCode};

/// Failure encountered while pumping bytes through the staging buffer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Reading from the source failed.
    #[error("reading source: {0}")]
    Source(#[source] std::io::Error),
    /// Writing to the destination failed.
    #[error("writing destination: {0}")]
    Sink(#[source] std::io::Error),
    /// The restart policy exhausted its attempt budget.
    #[error("gave up after {attempts} restart attempts")]
    RestartExhausted {
        /// How many attempts were made before giving up.
        attempts: u32,
    },
    /// The destination does not support seeking to a restart offset, and the
    /// engine's policy forbids silently truncating instead.
    #[error("destination does not support resuming at offset {offset}")]
    RestartUnsupported {
        /// The offset the engine tried to resume at.
        offset: u64,
    },
    /// The post-transfer checksum did not match what the source reported.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The digest computed over the destination.
        actual: String,
        /// The digest the source reported.
        expected: String,
    },
}

impl HasResultCode for TransferError {
    fn result_code(&self) -> ResultCode {
        match self {
            Self::Source(e) | Self::Sink(e) => ResultCode::from_io_error(e),
            Self::RestartExhausted { .. } | Self::RestartUnsupported { .. } => {
                ResultCode::SeeErrno
            }
            Self::ChecksumMismatch { .. } => ResultCode::StoreFailed,
        }
    }

    fn job_exit_code(&self) -> JobExitCode {
        JobExitCode::Partial
    }
}
