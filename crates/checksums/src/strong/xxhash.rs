//! XXH64, a fast non-cryptographic hash offered as the lightweight choice
//! for a transfer's verify phase when the peer doesn't advertise a stronger
//! digest command.

use super::StrongDigest;

/// Streaming XXH64 hasher.
///
/// XXH64 is an extremely fast non-cryptographic hash function that produces
/// 64-bit digests; cheap enough to run on every completed transfer as a
/// baseline integrity check even when a stronger digest isn't available.
///
/// # Examples
///
/// One-shot hashing with a seed:
///
/// ```
/// use checksums::strong::Xxh64;
///
/// // Seed is used to vary the hash output
/// let seed: u64 = 0x12345678;
/// let digest = Xxh64::digest(seed, b"data to hash");
/// assert_eq!(digest.len(), 8); // XXH64 produces 64-bit output
///
/// // Different seeds produce different outputs
/// let digest2 = Xxh64::digest(seed + 1, b"data to hash");
/// assert_ne!(digest, digest2);
/// ```
///
/// Incremental hashing:
///
/// ```
/// use checksums::strong::Xxh64;
///
/// let seed: u64 = 0;
///
/// let mut hasher = Xxh64::new(seed);
/// hasher.update(b"chunk 1");
/// hasher.update(b"chunk 2");
/// let digest = hasher.finalize();
///
/// // Equivalent to one-shot
/// assert_eq!(digest, Xxh64::digest(seed, b"chunk 1chunk 2"));
/// ```
///
/// Using the [`StrongDigest`](super::StrongDigest) trait:
///
/// ```
/// use checksums::strong::{Xxh64, StrongDigest};
///
/// // Create with explicit seed
/// let mut hasher: Xxh64 = StrongDigest::with_seed(42u64);
/// hasher.update(b"test");
/// let digest = hasher.finalize();
/// assert_eq!(digest.len(), Xxh64::DIGEST_LEN);
/// ```
#[derive(Clone)]
pub struct Xxh64 {
    inner: xxhash_rust::xxh64::Xxh64,
}

impl Xxh64 {
    /// Creates a hasher with the supplied seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use checksums::strong::Xxh64;
    ///
    /// let mut hasher = Xxh64::new(0); // seed = 0
    /// hasher.update(b"data");
    /// let digest = hasher.finalize();
    /// assert_eq!(digest.len(), 8);
    /// ```
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            inner: xxhash_rust::xxh64::Xxh64::new(seed),
        }
    }

    /// Feeds additional bytes into the digest state.
    ///
    /// # Examples
    ///
    /// ```
    /// use checksums::strong::Xxh64;
    ///
    /// let mut hasher = Xxh64::new(123);
    /// hasher.update(b"first part");
    /// hasher.update(b"second part");
    /// let digest = hasher.finalize();
    ///
    /// // Same as one-shot
    /// assert_eq!(digest, Xxh64::digest(123, b"first partsecond part"));
    /// ```
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalises the digest and returns the little-endian XXH64 output.
    ///
    /// # Examples
    ///
    /// ```
    /// use checksums::strong::Xxh64;
    ///
    /// let mut hasher = Xxh64::new(0);
    /// hasher.update(b"test");
    /// let digest = hasher.finalize();
    ///
    /// // The output is in little-endian format
    /// let _value = u64::from_le_bytes(digest);
    /// ```
    #[must_use]
    pub fn finalize(self) -> [u8; 8] {
        self.inner.digest().to_le_bytes()
    }

    /// Convenience helper that computes the XXH64 digest for `data` in one shot.
    ///
    /// # Examples
    ///
    /// ```
    /// use checksums::strong::Xxh64;
    ///
    /// // Hash with seed 0
    /// let digest = Xxh64::digest(0, b"hello");
    /// assert_eq!(digest.len(), 8);
    ///
    /// // Hash with a custom seed, e.g. to decorrelate from a default-seeded digest
    /// let seed: u64 = 0xCAFEBABE;
    /// let block_hash = Xxh64::digest(seed, b"file block data");
    /// ```
    #[must_use]
    pub fn digest(seed: u64, data: &[u8]) -> [u8; 8] {
        xxhash_rust::xxh64::xxh64(data, seed).to_le_bytes()
    }
}

impl StrongDigest for Xxh64 {
    type Seed = u64;
    type Digest = [u8; 8];
    const DIGEST_LEN: usize = 8;

    fn with_seed(seed: Self::Seed) -> Self {
        Xxh64::new(seed)
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.inner.digest().to_le_bytes()
    }
}
