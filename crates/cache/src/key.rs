//! The cache key: a session identity tuple, a path, and a listing mode.

/// Distinguishes a short-listing (`NLST`-style, names only) payload from a
/// long-listing (`LIST`/`MLSD`-style, full detail) payload cached under
/// the same path.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Mode {
    Short,
    Long,
}

/// Identifies one cached listing: which session produced it (by its
/// connection identity, not an ephemeral handle — two sessions to the
/// same host/user/port share entries), the path listed, and the mode.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheKey {
    pub session_identity: String,
    pub path: String,
    pub mode: Mode,
}

impl CacheKey {
    #[must_use]
    pub fn new(session_identity: impl Into<String>, path: impl Into<String>, mode: Mode) -> Self {
        Self {
            session_identity: session_identity.into(),
            path: path.into(),
            mode,
        }
    }
}
