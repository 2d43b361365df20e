//! The six long-listing dialect parsers raced against each other, plus the
//! short-listing fallback used outside `LONG_LIST` mode.

pub mod common;
pub mod dos;
pub mod eplf;
pub mod mac_webstar;
pub mod mlsd;
pub mod os2;
pub mod short;
pub mod unix;

use crate::file_info::FileInfo;

/// What one dialect parser made of a single line.
#[derive(Debug)]
pub enum ParseOutcome {
    /// A recognized entry.
    Entry(FileInfo),
    /// A recognized but uninteresting line (e.g. a `total NNN` header);
    /// not an error, and does not count against the dialect's error tally.
    Skip,
    /// The line did not match this dialect.
    Error,
}

/// One listing dialect: a name (for diagnostics) and a per-line parse
/// function. `tz` is the `timezone` resource used by dialects that build
/// an absolute timestamp from calendar fields with no explicit offset.
pub struct Dialect {
    pub name: &'static str,
    pub parse: fn(&str, time::UtcOffset) -> ParseOutcome,
}

/// All six raced long-listing dialects, in the original's trial order.
pub const DIALECTS: [Dialect; 6] = [
    Dialect { name: "unix", parse: unix::parse },
    Dialect { name: "dos", parse: dos::parse },
    Dialect { name: "eplf", parse: eplf::parse },
    Dialect { name: "mlsd", parse: mlsd::parse },
    Dialect { name: "os2", parse: os2::parse },
    Dialect { name: "mac_webstar", parse: mac_webstar::parse },
];
