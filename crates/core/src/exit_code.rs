//! Result and exit code definitions shared across the workspace.
//!
//! [`ResultCode`] is the small integer set that every session-level
//! operation (a `Ftp`-style connection method, a data-channel negotiation
//! step, a listing fetch) returns instead of a free-form error: callers
//! switch on it to decide whether to retry immediately, wait for the next
//! scheduler pass, or surface a fatal [`Message`](crate::message::Message).
//! [`JobExitCode`] is the coarser code a finished [`Job`](crate::scheduler)
//! reports up the job tree and that `bin/xfer` turns into a process exit
//! status.
//!
//! # Examples
//!
//! ```
//! use xfer_core::exit_code::ResultCode;
//!
//! let code = ResultCode::DoAgain;
//! assert_eq!(code.as_i32(), 2);
//! assert!(code.should_retry());
//! ```

use std::fmt;
use std::io;

/// Outcome of a single session- or channel-level operation.
///
/// Values below 4 are the "control" outcomes every `step()` call can
/// return regardless of what failed; values at or above 4 narrow down a
/// [`ResultCode::SeeErrno`]-class failure once the caller has looked at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResultCode {
    /// The operation completed successfully.
    Ok = 0,
    /// The operation is still running; call again after the scheduler wakes the task.
    InProgress = 1,
    /// The current step cannot proceed yet but a different step might; try the next one.
    DoAgain = 2,
    /// The operation failed; the caller should inspect the attached error for detail.
    SeeErrno = 3,
    /// A local store (cache, listing, buffer) failed to persist its result.
    StoreFailed = 4,
    /// The requested file is no longer at the path used to look it up (renamed or replaced).
    FileMoved = 5,
    /// The requested file does not exist.
    NoFile = 6,
    /// Authentication was rejected by the remote peer.
    LoginFailed = 7,
    /// The remote peer does not support the requested feature.
    NotSupported = 8,
}

impl ResultCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns a short human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::InProgress => "in progress",
            Self::DoAgain => "try again",
            Self::SeeErrno => "see attached error",
            Self::StoreFailed => "local store failed",
            Self::FileMoved => "file moved",
            Self::NoFile => "no such file",
            Self::LoginFailed => "login failed",
            Self::NotSupported => "not supported by remote",
        }
    }

    /// Reports whether the caller should immediately retry a different step
    /// rather than wait for the scheduler or surface an error.
    #[must_use]
    pub const fn should_retry(self) -> bool {
        matches!(self, Self::DoAgain)
    }

    /// Reports whether the operation is still in flight.
    #[must_use]
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Reports whether this code represents a failure the caller must act on.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        !matches!(self, Self::Ok | Self::InProgress | Self::DoAgain)
    }

    /// Creates a result code from an i32 value.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::InProgress),
            2 => Some(Self::DoAgain),
            3 => Some(Self::SeeErrno),
            4 => Some(Self::StoreFailed),
            5 => Some(Self::FileMoved),
            6 => Some(Self::NoFile),
            7 => Some(Self::LoginFailed),
            8 => Some(Self::NotSupported),
            _ => None,
        }
    }

    /// Maps a `std::io::Error` to the closest `ResultCode`.
    #[must_use]
    pub fn from_io_error(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NoFile,
            io::ErrorKind::PermissionDenied => Self::LoginFailed,
            io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Self::InProgress,
            io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe => Self::DoAgain,
            io::ErrorKind::Unsupported => Self::NotSupported,
            _ => Self::SeeErrno,
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<ResultCode> for i32 {
    fn from(code: ResultCode) -> Self {
        code.as_i32()
    }
}

/// Aggregated exit status of a finished [`Job`](crate::scheduler).
///
/// A job tree's root aggregates its children's codes by taking the worst
/// one (see [`JobExitCode::aggregate`]); `bin/xfer` converts the final
/// value into a process [`std::process::ExitCode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum JobExitCode {
    /// Every file transferred and verified successfully.
    Success = 0,
    /// At least one file failed but the job otherwise ran to completion.
    Partial = 1,
    /// The job was aborted by a signal or an explicit cancel before completing.
    Aborted = 2,
    /// The job could not start at all (bad arguments, unresolvable host, login rejected).
    Fatal = 3,
}

impl JobExitCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Combines this code with a child job's code, keeping the more severe one.
    #[must_use]
    pub fn aggregate(self, other: Self) -> Self {
        self.max(other)
    }

    /// Reports whether this code represents full success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for JobExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::Partial => "partial failure",
            Self::Aborted => "aborted",
            Self::Fatal => "fatal error",
        };
        f.write_str(text)
    }
}

impl From<JobExitCode> for std::process::ExitCode {
    fn from(code: JobExitCode) -> Self {
        Self::from(code.as_i32() as u8)
    }
}

/// Trait for error types that carry both a [`ResultCode`] and a [`JobExitCode`].
pub trait HasResultCode {
    /// The session-level result code for this error.
    fn result_code(&self) -> ResultCode;

    /// The job-level exit code this error should escalate to.
    fn job_exit_code(&self) -> JobExitCode {
        if self.result_code().is_failure() {
            JobExitCode::Fatal
        } else {
            JobExitCode::Success
        }
    }
}
