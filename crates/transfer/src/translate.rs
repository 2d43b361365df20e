//! ASCII-mode line-ending translation.
//!
//! When a transfer is not binary, bytes crossing the wire carry CRLF line
//! endings regardless of the local platform: writing injects a `\r` before
//! every `\n` that doesn't already have one, reading strips a `\r` that
//! precedes a `\n`. A lone `\r` landing at a chunk boundary can't be
//! resolved until the next chunk arrives, so both directions carry one byte
//! of state across calls.

use io::Translator;

/// Which way bytes are moving relative to the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AsciiMode {
    /// Local bytes are being sent out: inject CR before LF.
    ToNetwork,
    /// Wire bytes are coming in: strip CR before LF.
    FromNetwork,
}

/// Applies (or reverses) CRLF line-ending translation one chunk at a time.
pub struct EolTranslator {
    mode: AsciiMode,
    /// `ToNetwork`: the previous chunk's last byte was a bare `\r` already emitted.
    /// `FromNetwork`: a `\r` at the end of the previous chunk is waiting to see
    /// whether this chunk opens with `\n`.
    boundary_cr: bool,
}

impl EolTranslator {
    /// Creates a translator for the given direction.
    #[must_use]
    pub const fn new(mode: AsciiMode) -> Self {
        Self {
            mode,
            boundary_cr: false,
        }
    }

    fn translate_to_network(&mut self, input: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len());
        let mut prev_was_cr = self.boundary_cr;
        for &b in input {
            if b == b'\n' && !prev_was_cr {
                out.push(b'\r');
            }
            out.push(b);
            prev_was_cr = b == b'\r';
        }
        self.boundary_cr = prev_was_cr;
        out
    }

    fn translate_from_network(&mut self, input: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len());
        let mut i = 0;
        if self.boundary_cr {
            if input.first() == Some(&b'\n') {
                out.push(b'\n');
                i = 1;
            } else {
                out.push(b'\r');
            }
            self.boundary_cr = false;
        }
        while i < input.len() {
            let b = input[i];
            if b == b'\r' {
                match input.get(i + 1) {
                    Some(b'\n') => {
                        out.push(b'\n');
                        i += 2;
                    }
                    Some(_) => {
                        out.push(b'\r');
                        i += 1;
                    }
                    None => {
                        self.boundary_cr = true;
                        i += 1;
                    }
                }
            } else {
                out.push(b);
                i += 1;
            }
        }
        out
    }
}

impl Translator for EolTranslator {
    fn translate(&mut self, input: &[u8]) -> (Vec<u8>, usize) {
        let out = match self.mode {
            AsciiMode::ToNetwork => self.translate_to_network(input),
            AsciiMode::FromNetwork => self.translate_from_network(input),
        };
        (out, input.len())
    }

    fn reset(&mut self) {
        self.boundary_cr = false;
    }
}
