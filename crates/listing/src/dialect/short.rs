//! The short-listing fallback: one bare name per line, used only outside
//! long-listing mode. Not raced against the other dialects — there is
//! nothing to disambiguate, since a short listing carries no metadata.

use super::ParseOutcome;
use crate::file_info::FileInfo;

pub fn parse(line: &str, _tz: time::UtcOffset) -> ParseOutcome {
    let name = line.strip_prefix("./").unwrap_or(line);
    if name.is_empty() || name.contains('/') {
        return ParseOutcome::Error;
    }
    ParseOutcome::Entry(FileInfo::new(name))
}
