//! Errors surfaced by reply parsing and data-channel negotiation.

use thiserror::Error;

/// Failure decoding a line-oriented control-protocol reply.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ReplyError {
    /// A reply line did not start with a three-digit code.
    #[error("malformed reply line: {0:?}")]
    Malformed(String),
    /// A multi-line reply's continuation lines never reached their
    /// terminator (`NNN ` on its own line with the matching code).
    #[error("multi-line reply {0} never terminated")]
    Unterminated(u16),
}

/// Failure negotiating or decoding a data-channel address.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DataChannelError {
    /// The `227` (PASV) reply body did not contain six comma-separated integers.
    #[error("malformed PASV reply: {0:?}")]
    MalformedPasv(String),
    /// The `229` (EPSV) reply body did not contain a port between matching delimiters.
    #[error("malformed EPSV reply: {0:?}")]
    MalformedEpsv(String),
    /// An `EPRT`/`EPSV` address family digit was not `1` or `2`.
    #[error("unsupported EPRT/EPSV address family {0:?}")]
    UnsupportedFamily(String),
}
