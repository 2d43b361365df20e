#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `compress` implements the zlib/deflate codec used for MODE Z compressed
//! transfers. Per the session's negotiated `xfer:verify`-adjacent compression
//! setting, the transfer engine wraps the data connection in the encoder on
//! the sending side and the decoder on the receiving side; once the deflate
//! stream ends, any further bytes on the connection are passed through
//! verbatim (some servers concatenate uncompressed trailing data after the
//! compressed payload).
//!
//! # Design
//!
//! [`zlib`] implements a streaming-friendly encoder and decoder built on top
//! of [`flate2`](https://docs.rs/flate2). The API emphasises incremental
//! processing: callers provide scratch buffers that are filled with
//! compressed or decompressed data while the internal state tracks totals for
//! diagnostics and progress reporting. [`algorithm`] exposes the
//! [`algorithm::CompressionAlgorithm`] selector the session configuration
//! picks by name.
//!
//! # Invariants
//!
//! - Encoders and decoders never allocate internal output buffers. All output
//!   is written into the caller-provided vectors, allowing upper layers to
//!   reuse storage across files.
//! - Streams are finalised explicitly via
//!   [`zlib::CountingZlibEncoder::finish`], which emits trailer bytes and
//!   reports the final compressed length.
//! - Errors from the underlying zlib implementation are surfaced as
//!   [`std::io::Error`] values to integrate with the rest of the workspace.
//!
//! # Errors
//!
//! The encoder and decoder functions return [`std::io::Result`]. When zlib
//! reports an error the helper wraps it in [`std::io::ErrorKind::Other`].
//!
//! # Examples
//!
//! Compressing and decompressing a buffer with the streaming encoder and
//! convenience helpers:
//!
//! ```
//! use compress::zlib::{CompressionLevel, CountingZlibEncoder, compress_to_vec, decompress_to_vec};
//!
//! # fn main() -> std::io::Result<()> {
//! let data = b"streaming example payload";
//! let mut encoder = CountingZlibEncoder::new(CompressionLevel::Default);
//! encoder.write(data)?;
//! let compressed_len = encoder.finish()?;
//! assert!(compressed_len > 0);
//!
//! let compressed = compress_to_vec(data, CompressionLevel::Default)?;
//! let decompressed = decompress_to_vec(&compressed)?;
//! assert_eq!(decompressed, data);
//! # Ok(())
//! # }
//! ```
//!
//! # See also
//!
//! - [`zlib`] for the encoder/decoder implementation and API surface.
//! - `xfer-io`'s `Translator`, which wires this codec into the buffered I/O
//!   pipe alongside the charset recoder.

pub mod algorithm;
mod common;
pub mod zlib;

pub use common::CountingSink;
