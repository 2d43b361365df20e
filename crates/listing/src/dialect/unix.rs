//! UNIX `ls -l` long listing:
//! `permbits owner … size month day (year|hh:mm) name [-> target]`
//!
//! ```text
//! -rwxr-xr-x   1 lav      root         4771 Sep 12  1996 install-sh
//! drwxr-xr-x   4 lav      root         1024 Feb 22 15:32 lib
//! lrwxrwxrwx   1 lav      root           33 Feb 14 17:45 ltconfig -> /usr/share/libtool/ltconfig
//! ```

use super::ParseOutcome;
use super::common::{FieldCursor, guess_year, make_unix_time, parse_month, parse_perms};
use crate::file_info::{FileInfo, FileType};

pub fn parse(line: &str, tz: time::UtcOffset) -> ParseOutcome {
    if line.trim_start().starts_with("total ") {
        return ParseOutcome::Skip;
    }

    let mut fields = FieldCursor::new(line);
    let Some(perm_field) = fields.next_field() else {
        return ParseOutcome::Error;
    };
    let Some(first) = perm_field.as_bytes().first().copied() else {
        return ParseOutcome::Error;
    };

    let mut info = FileInfo::new("");
    match first {
        b'l' => info.set_type(FileType::Symlink),
        b'd' => info.set_type(FileType::Directory),
        b'-' => info.set_type(FileType::Normal),
        b'b' | b'c' | b'p' | b's' => return ParseOutcome::Skip,
        _ => return ParseOutcome::Error,
    }
    if let Some(mode) = parse_perms(&perm_field[1..]) {
        info.set_mode(mode);
    }

    // link count
    if fields.next_field().is_none() {
        return ParseOutcome::Error;
    }
    // owner
    if fields.next_field().is_none() {
        return ParseOutcome::Error;
    }

    let Some(group_or_size) = fields.next_field() else {
        return ParseOutcome::Error;
    };
    let Some(next) = fields.next_field() else {
        return ParseOutcome::Error;
    };

    let month_token;
    if next.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        // group_or_size was the group; next is the size.
        if let Ok(size) = next.parse::<u64>() {
            info.set_size(size);
        }
        let Some(m) = fields.next_field() else {
            return ParseOutcome::Error;
        };
        month_token = m;
    } else {
        // group_or_size was actually the size; next is the month.
        if let Ok(size) = group_or_size.parse::<u64>() {
            info.set_size(size);
        }
        month_token = next;
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
        if let Some(ts) = make_unix_time(year, month, day, hour, minute, 30, tz) {
            info.set_date(ts);
        }
    } else {
        let Ok(year) = time_or_year.parse::<i32>() else {
            return ParseOutcome::Error;
        };
        if let Some(ts) = make_unix_time(year, month, day, 12, 0, 30, tz) {
            info.set_date_imprecise(ts);
        }
    }

    let name_field = fields.remainder().trim_start();
    if name_field.is_empty() {
        return ParseOutcome::Error;
    }

    if matches!(info.file_type(), Some(FileType::Symlink)) {
        if let Some((name, target)) = name_field.split_once(" -> ") {
            info.set_name(name);
            info.set_symlink(target);
        } else {
            info.set_name(name_field);
        }
    } else {
        info.set_name(name_field);
    }

    if info.name().contains('/') {
        return ParseOutcome::Error;
    }

    ParseOutcome::Entry(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_plain_file_line_parses_all_fields() {
        let outcome = parse("-rwxr-xr-x   1 lav      root         4771 Sep 12  1996 install-sh", time::UtcOffset::UTC);
        let ParseOutcome::Entry(info) = outcome else { panic!("expected an entry") };
        assert_eq!(info.name(), "install-sh");
        assert_eq!(info.size(), Some(4771));
        assert_eq!(info.file_type(), Some(FileType::Normal));
        assert_eq!(info.mode(), Some(0o755));
        assert!(!info.date().unwrap().precise);
    }

    #[test]
    fn a_directory_with_a_time_instead_of_year_is_precise() {
        let outcome = parse("drwxr-xr-x   4 lav      root         1024 Feb 22 15:32 lib", time::UtcOffset::UTC);
        let ParseOutcome::Entry(info) = outcome else { panic!("expected an entry") };
        assert_eq!(info.file_type(), Some(FileType::Directory));
        assert!(info.date().unwrap().precise);
    }

    #[test]
    fn a_symlink_line_splits_name_from_target() {
        let outcome = parse(
            "lrwxrwxrwx   1 lav      root           33 Feb 14 17:45 ltconfig -> /usr/share/libtool/ltconfig",
            time::UtcOffset::UTC,
        );
        let ParseOutcome::Entry(info) = outcome else { panic!("expected an entry") };
        assert_eq!(info.name(), "ltconfig");
        assert_eq!(info.symlink_target(), Some("/usr/share/libtool/ltconfig"));
    }

    #[test]
    fn a_total_header_line_is_skipped_not_an_error() {
        assert!(matches!(parse("total 123", time::UtcOffset::UTC), ParseOutcome::Skip));
    }

    #[test]
    fn garbage_input_is_an_error() {
        assert!(matches!(parse("not a listing line at all", time::UtcOffset::UTC), ParseOutcome::Error));
    }
}
