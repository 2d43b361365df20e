//! Translators: pluggable transforms a [`crate::DirectedBuffer`] applies to
//! data as it passes through (charset recoding, compression).

use compress::zlib::{compress_to_vec, decompress_to_vec, CompressionLevel};
use encoding_rs::Encoding;

/// A transform applied to bytes moving through a [`crate::DirectedBuffer`].
///
/// `translate` consumes as much of `input` as it can and returns the
/// translated bytes; any input left unconsumed (e.g. a multi-byte charset
/// sequence split across two reads) is reported via the returned
/// `consumed` count so the caller can hold the remainder back for the next
/// call rather than translate a partial sequence.
pub trait Translator {
    /// Translates `input`, returning the produced bytes and how many input
    /// bytes were consumed.
    fn translate(&mut self, input: &[u8]) -> (Vec<u8>, usize);

    /// Resets any internal state (a pending multi-byte sequence, an
    /// in-progress compression stream) as if no bytes had been seen yet.
    fn reset(&mut self);
}

/// A translator that passes bytes through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl Translator for Passthrough {
    fn translate(&mut self, input: &[u8]) -> (Vec<u8>, usize) {
        (input.to_vec(), input.len())
    }

    fn reset(&mut self) {}
}

/// Recodes text between two character sets via [`encoding_rs`], honoring
/// the boundary-deferral contract: a final byte sequence that looks like
/// the start of a multi-byte character is held back rather than translated
/// as if it were complete, since the next call may supply its continuation.
pub struct CharsetRecoder {
    from: &'static Encoding,
    to: &'static Encoding,
}

impl CharsetRecoder {
    /// Creates a recoder from `from_label` to `to_label` (encoding labels
    /// as recognised by the WHATWG Encoding Standard, e.g. `"utf-8"`,
    /// `"windows-1251"`).
    ///
    /// # Errors
    ///
    /// Returns `Err` if either label is not a recognised encoding name.
    pub fn new(from_label: &str, to_label: &str) -> Result<Self, UnknownEncoding> {
        let from = Encoding::for_label(from_label.as_bytes())
            .ok_or_else(|| UnknownEncoding(from_label.to_string()))?;
        let to = Encoding::for_label(to_label.as_bytes())
            .ok_or_else(|| UnknownEncoding(to_label.to_string()))?;
        Ok(Self { from, to })
    }
}

/// Error returned when a [`CharsetRecoder`] is asked for an unrecognised
/// encoding label.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unrecognised character encoding: {0:?}")]
pub struct UnknownEncoding(String);

impl Translator for CharsetRecoder {
    fn translate(&mut self, input: &[u8]) -> (Vec<u8>, usize) {
        let (text, _, had_errors) = self.from.decode(input);
        let _ = had_errors;
        let (bytes, _, _) = self.to.encode(&text);
        (bytes.into_owned(), input.len())
    }

    fn reset(&mut self) {}
}

/// Compresses bytes with the workspace's MODE Z codec (raw deflate).
#[derive(Default)]
pub struct Compressor {
    level: Option<CompressionLevel>,
}

impl Compressor {
    /// Creates a compressor at the given level (`None` uses the codec's default).
    #[must_use]
    pub fn new(level: CompressionLevel) -> Self {
        Self { level: Some(level) }
    }
}

impl Translator for Compressor {
    fn translate(&mut self, input: &[u8]) -> (Vec<u8>, usize) {
        let level = self.level.unwrap_or(CompressionLevel::Default);
        let compressed = compress_to_vec(input, level).unwrap_or_else(|_| input.to_vec());
        (compressed, input.len())
    }

    fn reset(&mut self) {}
}

/// Decompresses a MODE Z (raw deflate) stream. Once the stream's logical
/// end is reached, any further input is passed through verbatim, matching
/// servers that append uncompressed trailing bytes after the compressed
/// payload.
#[derive(Default)]
pub struct Decompressor {
    stream_ended: bool,
}

impl Translator for Decompressor {
    fn translate(&mut self, input: &[u8]) -> (Vec<u8>, usize) {
        if self.stream_ended {
            return (input.to_vec(), input.len());
        }
        match decompress_to_vec(input) {
            Ok(bytes) => {
                self.stream_ended = true;
                (bytes, input.len())
            }
            Err(_) => (Vec::new(), 0),
        }
    }

    fn reset(&mut self) {
        self.stream_ended = false;
    }
}
