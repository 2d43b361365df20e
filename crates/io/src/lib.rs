//! # Overview
//!
//! `io` implements the buffered I/O pipe every connection-facing component
//! reads and writes through: a growable byte buffer with a read cursor, an
//! optional save/rollback window for the listing cache's replay, and a
//! pluggable [`translator::Translator`] seam for charset recoding and MODE Z
//! compression. [`buffer::Buffer`] is the low-level primitive;
//! [`DirectedBuffer`] wraps it with a fixed direction (reading from the wire
//! or writing to it) and an attached translator.
//!
//! # Design
//!
//! - [`buffer::Buffer`] owns storage, the read cursor, EOF/broken/error
//!   flags, and the big-endian pack/unpack helpers used by binary protocol
//!   framing.
//! - [`translator`] defines the [`translator::Translator`] trait and three
//!   implementations: [`translator::Passthrough`],
//!   [`translator::CharsetRecoder`] (via [`encoding_rs`]), and the
//!   [`translator::Compressor`]/[`translator::Decompressor`] pair (via the
//!   `compress` crate's MODE Z codec).
//! - [`speedometer::Speedometer`] smooths byte counts into a decaying
//!   transfer-rate estimate for progress display.
//!
//! # Invariants
//!
//! - [`buffer::Buffer::get`] never returns bytes already consumed by
//!   [`buffer::Buffer::skip`] unless save mode is enabled and the
//!   requested position is still within the retained window (buffer byte
//!   preservation, save/rollback law).
//! - A [`translator::Translator`] never discards unconsumed input; any
//!   byte not reported as consumed remains available on the next call.
//!
//! # See also
//!
//! - `protocol`'s `Session`, which drives a control connection's bytes
//!   through a [`buffer::Buffer`].
//! - `transfer`, which pairs a source and destination [`DirectedBuffer`]
//!   around a staging buffer.

pub mod buffer;
pub mod speedometer;
pub mod translator;

pub use buffer::{Buffer, RollbackError};
pub use speedometer::Speedometer;
pub use translator::Translator;

/// A [`Buffer`] fixed to one direction (reading or writing) with an
/// attached [`Translator`] applied as data flows through.
pub struct DirectedBuffer<T: Translator> {
    buffer: Buffer,
    direction: Direction,
    translator: T,
}

/// Which way data flows through a [`DirectedBuffer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Reading from the connection into the session.
    Get,
    /// Writing from the session to the connection.
    Put,
}

impl<T: Translator> DirectedBuffer<T> {
    /// Creates a directed buffer with the given translator.
    pub fn new(direction: Direction, translator: T) -> Self {
        Self {
            buffer: Buffer::new(),
            direction,
            translator,
        }
    }

    /// The buffer's direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Direct access to the underlying buffer.
    pub fn buffer(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    /// Feeds raw bytes through the translator and appends the result to
    /// the buffer.
    pub fn put_translated(&mut self, raw: &[u8]) {
        let (translated, _consumed) = self.translator.translate(raw);
        self.buffer.put(&translated);
    }

    /// Resets the translator's internal state and empties the buffer,
    /// used when a connection is re-established and in-flight translation
    /// state (a partial multi-byte sequence, a compression stream) is no
    /// longer valid.
    pub fn reset_translation(&mut self) {
        self.translator.reset();
        self.buffer.empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use translator::Passthrough;

    #[test]
    fn directed_buffer_applies_its_translator_on_put() {
        let mut directed = DirectedBuffer::new(Direction::Put, Passthrough);
        directed.put_translated(b"abc");
        assert_eq!(directed.buffer().get(), b"abc");
        assert_eq!(directed.direction(), Direction::Put);
    }
}
