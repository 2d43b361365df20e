//! Enumeration of the compression algorithms recognised by the workspace.

use ::core::str::FromStr;

use thiserror::Error;

/// Compression algorithms recognised by the workspace.
///
/// The transfer engine currently negotiates a single algorithm (zlib/deflate,
/// per MODE Z); the enum exists so the negotiation and configuration layers
/// have a stable type to pass around rather than a bare string, and so a
/// second algorithm can be added later without changing call sites.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum CompressionAlgorithm {
    /// Classic zlib/deflate compression.
    #[default]
    Zlib,
}

impl CompressionAlgorithm {
    /// Returns the canonical display name used for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CompressionAlgorithm::Zlib => "zlib",
        }
    }

    /// Returns the default compression algorithm.
    #[must_use]
    pub const fn default_algorithm() -> Self {
        CompressionAlgorithm::Zlib
    }

    /// Returns the set of algorithms available in the current build.
    #[must_use]
    pub fn available() -> &'static [CompressionAlgorithm] {
        const ALGORITHMS: &[CompressionAlgorithm] = &[CompressionAlgorithm::Zlib];
        ALGORITHMS
    }
}

/// Error returned when attempting to parse an unsupported compression algorithm.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unsupported compression algorithm: {input}")]
pub struct CompressionAlgorithmParseError {
    input: String,
}

impl CompressionAlgorithmParseError {
    /// Creates a parse error capturing the original input.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the invalid input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = CompressionAlgorithmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zlib" | "zlibx" | "deflate" => Ok(CompressionAlgorithm::Zlib),
            other => Err(CompressionAlgorithmParseError::new(other.to_string())),
        }
    }
}
