//! TLS upgrade abstraction for `AUTH TLS` / `PROT`.
//!
//! The control and data connections both need the same handshake-then-wrap
//! behavior once `AUTH TLS` succeeds, and a test double that never touches
//! real cryptography. [`SecureChannel`] is the seam; callers depend on the
//! trait, not a concrete TLS library, so swapping the backend never touches
//! session logic.

use std::io;

/// Data-protection level selected by `PROT`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ProtectionLevel {
    /// `PROT C`: clear data channel (handshake already happened on control only).
    Clear,
    /// `PROT P`: private (encrypted) data channel.
    Private,
}

/// A connection that can be upgraded to TLS in place.
///
/// Implementations wrap a byte stream (control or data connection) and
/// perform the handshake lazily on first use, matching how `AUTH TLS` is
/// negotiated mid-session rather than at connect time.
pub trait SecureChannel {
    /// Performs (or continues) the TLS handshake. Returns `Ok(true)` once
    /// the handshake has completed, `Ok(false)` if it needs another call
    /// (non-blocking I/O would block), and `Err` on a fatal handshake
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O or handshake error.
    fn do_handshake(&mut self) -> io::Result<bool>;

    /// Reads plaintext bytes through the secure channel into `buf`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes plaintext bytes through the secure channel.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Sends a close-notify and stops encrypting further traffic.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn shutdown(&mut self) -> io::Result<()>;

    /// Whether the handshake has more bytes to send before it can proceed
    /// (used to drive non-blocking I/O readiness).
    fn want_out(&self) -> bool;

    /// Whether the handshake is waiting on more bytes from the peer.
    fn want_in(&self) -> bool;

    /// Copies the negotiated session ID from another channel, letting a
    /// data connection's handshake resume the control connection's TLS
    /// session instead of performing a full new one (required by some
    /// servers that reject a data-channel handshake with a fresh session).
    fn copy_session_id(&mut self, from: &dyn SecureChannel);

    /// Whether the peer's certificate has been verified against the
    /// session's trust policy.
    fn certificate_verified(&self) -> bool;
}

/// A [`SecureChannel`] that performs no real cryptography, for sessions
/// running in plaintext and for tests that exercise the `AUTH TLS`/`PROT`
/// state machine without a real TLS stack.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSecureChannel {
    handshaken: bool,
}

impl NullSecureChannel {
    /// Creates a channel with the handshake not yet performed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecureChannel for NullSecureChannel {
    fn do_handshake(&mut self) -> io::Result<bool> {
        self.handshaken = true;
        Ok(true)
    }

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn want_out(&self) -> bool {
        false
    }

    fn want_in(&self) -> bool {
        false
    }

    fn copy_session_id(&mut self, _from: &dyn SecureChannel) {}

    fn certificate_verified(&self) -> bool {
        self.handshaken
    }
}
