//! Digest implementations offered for a transfer's verify phase.
//!
//! After a copy job finishes, it can run one of these digests over the
//! source and destination to confirm the bytes actually landed correctly,
//! independent of the control-protocol size/timestamp check already
//! performed during the copy. This module exposes streaming wrappers for
//! MD5, SHA-1, SHA-256, SHA-512, and XXH64 behind the common
//! [`StrongDigest`] trait so the transfer engine can pick one by name
//! without hard-coding the algorithm.

mod md5;
mod sha1;
mod sha256;
mod sha512;
mod xxhash;

pub use md5::Md5;
pub use sha1::Sha1;
pub use sha256::Sha256;
pub use sha512::Sha512;
pub use xxhash::Xxh64;

/// Trait implemented by every digest algorithm offered for the verify phase.
///
/// Implementors provide a streaming interface: callers feed data
/// incrementally via [`Self::update`] and then obtain the final digest
/// through [`Self::finalize`]. The associated [`DIGEST_LEN`](Self::DIGEST_LEN)
/// constant exposes the byte width of the resulting hash so higher layers
/// can size buffers without hard-coding algorithm-specific knowledge.
///
/// # Examples
///
/// Compute an MD5 digest through the trait without depending on the concrete
/// hasher type.
///
/// ```
/// use checksums::strong::{Md5, StrongDigest};
///
/// let mut hasher = Md5::new();
/// hasher.update(b"example");
/// let digest = hasher.finalize();
/// assert_eq!(digest.as_ref().len(), Md5::DIGEST_LEN);
/// ```
pub trait StrongDigest: Sized {
    /// Type used to parameterise a new digest instance.
    type Seed: Default;

    /// Type returned when finalising the digest.
    type Digest: AsRef<[u8]> + Copy;

    /// Length of the final digest in bytes.
    const DIGEST_LEN: usize;

    /// Creates a new hasher with an empty state.
    fn new() -> Self {
        Self::with_seed(Default::default())
    }

    /// Creates a new hasher using the provided seed value.
    fn with_seed(seed: Self::Seed) -> Self;

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Finalises the digest and returns the resulting hash.
    fn finalize(self) -> Self::Digest;

    /// Convenience helper that hashes `data` in a single call.
    fn digest(data: &[u8]) -> Self::Digest {
        Self::digest_with_seed(Default::default(), data)
    }

    /// Convenience helper that hashes `data` using an explicit seed value.
    fn digest_with_seed(seed: Self::Seed, data: &[u8]) -> Self::Digest {
        let mut hasher = Self::with_seed(seed);
        hasher.update(data);
        hasher.finalize()
    }
}

/// The digest algorithms a transfer's verify phase can be configured to use.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum VerifyAlgorithm {
    /// MD5, kept for compatibility with peers that only expose an `MD5SUM`-style command.
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256, the recommended default.
    Sha256,
    /// SHA-512.
    Sha512,
    /// XXH64, fast but non-cryptographic; suitable for corruption detection, not tamper detection.
    Xxh64,
}

impl VerifyAlgorithm {
    /// Computes the chosen algorithm's digest over `data` in one shot and
    /// returns it as a lowercase hex string, the form compared against a
    /// peer-reported checksum.
    #[must_use]
    pub fn hex_digest(self, data: &[u8]) -> String {
        fn to_hex(bytes: &[u8]) -> String {
            use std::fmt::Write as _;
            let mut out = String::with_capacity(bytes.len() * 2);
            for byte in bytes {
                let _ = write!(&mut out, "{byte:02x}");
            }
            out
        }

        match self {
            Self::Md5 => to_hex(Md5::digest(data).as_ref()),
            Self::Sha1 => to_hex(Sha1::digest(data).as_ref()),
            Self::Sha256 => to_hex(Sha256::digest(data).as_ref()),
            Self::Sha512 => to_hex(Sha512::digest(data).as_ref()),
            Self::Xxh64 => to_hex(Xxh64::digest(0, data).as_ref()),
        }
    }
}
