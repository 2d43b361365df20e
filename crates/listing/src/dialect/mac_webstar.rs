//! WebStar (classic Mac OS FTP server) long listing:
//! `permbits [placeholder size | folder] month day (year|hh:mm) name [-> target]`
//!
//! ```text
//! -------r--         326  1391972 Nov 22  1995 MegaPhone.sit
//! d--------- folder        2 Jan 22  1996 Web Pages
//! ```
//!
//! The `-> target` split is meaningless on a system with no symlinks; it
//! is ported anyway for fidelity with listings from gatewayed shares.

use super::ParseOutcome;
use super::common::{FieldCursor, guess_year, make_unix_time, parse_month, parse_perms};
use crate::file_info::{FileInfo, FileType};

pub fn parse(line: &str, tz: time::UtcOffset) -> ParseOutcome {
    let mut fields = FieldCursor::new(line);

    let Some(perm_field) = fields.next_field() else {
        return ParseOutcome::Error;
    };
    let Some(first) = perm_field.as_bytes().first().copied() else {
        return ParseOutcome::Error;
    };

    let mut info = FileInfo::new("");
    let perm_says_folder = first == b'd';
    info.set_type(if perm_says_folder { FileType::Directory } else { FileType::Normal });
    if perm_field.len() >= 10 {
        if let Some(mode) = parse_perms(&perm_field[1..10]) {
            info.set_mode(mode);
        }
    }

    let Some(token) = fields.next_field() else {
        return ParseOutcome::Error;
    };

    let month_token;
    if token.eq_ignore_ascii_case("folder") {
        info.set_type(FileType::Directory);
        let Some(m) = fields.next_field() else {
            return ParseOutcome::Error;
        };
        month_token = m;
    } else {
        // token was a placeholder; one more placeholder, then the size.
        let Some(size_token) = fields.next_field() else {
            return ParseOutcome::Error;
        };
        if let Ok(size) = size_token.parse::<u64>() {
            info.set_size(size);
        }
        let Some(m) = fields.next_field() else {
            return ParseOutcome::Error;
        };
        month_token = m;
    }

    let Some(month) = parse_month(month_token) else {
        return ParseOutcome::Error;
    };
    let Some(day_token) = fields.next_field() else {
        return ParseOutcome::Error;
    };
    let Ok(day) = day_token.parse::<u32>() else {
        return ParseOutcome::Error;
    };

    let Some(time_or_year) = fields.next_field() else {
        return ParseOutcome::Error;
    };
    if time_or_year.len() == 5 && time_or_year.as_bytes().get(2) == Some(&b':') {
        let (Ok(hour), Ok(minute)) = (time_or_year[0..2].parse::<u32>(), time_or_year[3..5].parse::<u32>()) else {
            return ParseOutcome::Error;
        };
        let year = guess_year(month, day, hour, minute);
        if let Some(ts) = make_unix_time(year, month, day, hour, minute, 0, tz) {
            info.set_date(ts);
        }
    } else {
        let Ok(year) = time_or_year.parse::<i32>() else {
            return ParseOutcome::Error;
        };
        if let Some(ts) = make_unix_time(year, month, day, 12, 0, 0, tz) {
            info.set_date_imprecise(ts);
        }
    }

    let name_field = fields.remainder().trim_start();
    if name_field.is_empty() {
        return ParseOutcome::Error;
    }
    if let Some((name, target)) = name_field.split_once(" -> ") {
        info.set_name(name);
        info.set_symlink(target);
    } else {
        info.set_name(name_field);
    }

    ParseOutcome::Entry(info)
}
