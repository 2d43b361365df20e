//! Optional post-transfer checksum verification.
//!
//! Independent of the size/timestamp check the control protocol already
//! performs, a job can ask the engine to hash the destination as it writes
//! and compare the result against a digest the source reports (e.g. via an
//! `XSHA256` / `MD5SUM`-style command).

use checksums::strong::{Md5, Sha1, Sha256, Sha512, StrongDigest, VerifyAlgorithm, Xxh64};

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

/// A running digest over the bytes written to the destination.
pub enum Verifier {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
    Xxh64(Xxh64),
}

impl Verifier {
    /// Starts a fresh verifier using the given algorithm.
    #[must_use]
    pub fn new(algorithm: VerifyAlgorithm) -> Self {
        match algorithm {
            VerifyAlgorithm::Md5 => Self::Md5(Md5::new()),
            VerifyAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            VerifyAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            VerifyAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
            VerifyAlgorithm::Xxh64 => Self::Xxh64(Xxh64::new()),
        }
    }

    /// Feeds another chunk of destination bytes into the running digest.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.update(data),
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Xxh64(h) => h.update(data),
        }
    }

    /// Finalizes the digest as a lowercase hex string, the same form
    /// [`VerifyAlgorithm::hex_digest`] produces.
    #[must_use]
    pub fn finish(self) -> String {
        match self {
            Self::Md5(h) => to_hex(h.finalize().as_ref()),
            Self::Sha1(h) => to_hex(h.finalize().as_ref()),
            Self::Sha256(h) => to_hex(h.finalize().as_ref()),
            Self::Sha512(h) => to_hex(h.finalize().as_ref()),
            Self::Xxh64(h) => to_hex(h.finalize().as_ref()),
        }
    }
}
