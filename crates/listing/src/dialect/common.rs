//! Helpers shared by several dialect parsers: permission-bit decoding,
//! month-name lookup, and the "guess the year" heuristic `ls` output needs
//! when only month/day/time are given.

use std::time::SystemTime;
use time::OffsetDateTime;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parses a three-letter (or longer, matched by prefix) month abbreviation,
/// case-insensitively, returning a zero-based month index.
#[must_use]
pub fn parse_month(token: &str) -> Option<u32> {
    let lower = token.to_ascii_lowercase();
    let prefix = lower.get(0..3)?;
    MONTHS.iter().position(|m| *m == prefix).map(|i| i as u32)
}

/// Decodes a UNIX-style nine-character permission string (e.g.
/// `rwxr-xr-x`) into a mode bitmask. Returns `None` if any character is
/// not one of the expected permission letters or `-`.
#[must_use]
pub fn parse_perms(perms: &str) -> Option<u32> {
    if perms.len() < 9 {
        return None;
    }
    let bytes = perms.as_bytes();
    let mut mode: u32 = 0;
    const BITS: [u32; 9] = [0o400, 0o200, 0o100, 0o040, 0o020, 0o010, 0o004, 0o002, 0o001];
    for (i, &bit) in BITS.iter().enumerate() {
        match bytes[i] {
            b'-' => {}
            b'r' | b'w' | b'x' | b's' | b'S' | b't' | b'T' => mode |= bit,
            _ => return None,
        }
    }
    Some(mode)
}

/// Given a month (0-based) and day with no year, guesses the year: if the
/// resulting date would be in the future relative to now, assume last
/// year instead (mirrors `ls`'s own heuristic for recent files reported
/// without a year).
#[must_use]
pub fn guess_year(month: u32, day: u32, hour: u32, minute: u32) -> i32 {
    let now = OffsetDateTime::from(SystemTime::now());
    let this_year = now.year();
    let now_month0 = now.month() as u32 - 1;
    let in_the_future = (month, day, hour, minute) > (now_month0, u32::from(now.day()), u32::from(now.hour()), u32::from(now.minute()));
    if in_the_future { this_year - 1 } else { this_year }
}

/// Builds a Unix timestamp from calendar fields at the given UTC offset
/// (the resource-store-provided `timezone` used by several dialects).
pub fn make_unix_time(year: i32, month0: u32, day: u32, hour: u32, minute: u32, second: u32, tz: time::UtcOffset) -> Option<i64> {
    let month = time::Month::try_from((month0 + 1) as u8).ok()?;
    let date = time::Date::from_calendar_date(year, month, day as u8).ok()?;
    let time_of_day = time::Time::from_hms(hour as u8, minute as u8, second as u8).ok()?;
    let dt = date.with_time(time_of_day).assume_offset(tz);
    Some(dt.unix_timestamp())
}

/// A cursor over whitespace-separated fields that, unlike
/// [`str::split_whitespace`], can hand back "everything from here to the
/// end of the line" once the caller has consumed its fixed-width fields —
/// the listing dialects need this for filenames that may themselves
/// contain spaces.
pub struct FieldCursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    #[must_use]
    pub fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    /// Returns the next whitespace-delimited field, advancing past it and
    /// the whitespace that follows.
    pub fn next_field(&mut self) -> Option<&'a str> {
        let rest = &self.line[self.pos..];
        let start_in_rest = rest.find(|c: char| !c.is_whitespace())?;
        let after_start = &rest[start_in_rest..];
        let len = after_start.find(char::is_whitespace).unwrap_or(after_start.len());
        self.pos += start_in_rest + len;
        Some(&after_start[..len])
    }

    /// Everything remaining after the whitespace following the last field
    /// returned by [`FieldCursor::next_field`], with no further trimming.
    #[must_use]
    pub fn remainder(&self) -> &'a str {
        let rest = &self.line[self.pos..];
        let skip = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
        &rest[skip..]
    }
}
