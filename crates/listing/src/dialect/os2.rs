//! OS/2 long listing: `size [DIR] MM-DD-YY HH:MM name`.
//!
//! ```text
//!       36828  07-06-99  12:30  zipdir
//!        <DIR>  07-06-99  12:30  ProgFiles
//! ```

use super::ParseOutcome;
use super::common::{FieldCursor, make_unix_time};
use crate::file_info::{FileInfo, FileType};

pub fn parse(line: &str, tz: time::UtcOffset) -> ParseOutcome {
    let mut fields = FieldCursor::new(line);

    let Some(size_or_dir) = fields.next_field() else {
        return ParseOutcome::Error;
    };

    let mut info = FileInfo::new("");
    if size_or_dir == "<DIR>" || size_or_dir.eq_ignore_ascii_case("dir") {
        info.set_type(FileType::Directory);
    } else {
        let Ok(size) = size_or_dir.parse::<u64>() else {
            return ParseOutcome::Error;
        };
        info.set_size(size);
        info.set_type(FileType::Normal);
    }

    let Some(date_token) = fields.next_field() else {
        return ParseOutcome::Error;
    };
    let parts: Vec<&str> = date_token.splitn(3, '-').collect();
    let [month_s, day_s, year_s] = parts.as_slice() else {
        return ParseOutcome::Error;
    };
    let (Ok(month), Ok(day), Ok(mut year)) = (month_s.parse::<u32>(), day_s.parse::<u32>(), year_s.parse::<i32>()) else {
        return ParseOutcome::Error;
    };
    if month == 0 || month > 12 {
        return ParseOutcome::Error;
    }
    year += if year >= 70 { 1900 } else { 2000 };

    let Some(time_token) = fields.next_field() else {
        return ParseOutcome::Error;
    };
    let Some((hour_s, minute_s)) = time_token.split_once(':') else {
        return ParseOutcome::Error;
    };
    let (Ok(hour), Ok(minute)) = (hour_s.parse::<u32>(), minute_s.parse::<u32>()) else {
        return ParseOutcome::Error;
    };

    if let Some(ts) = make_unix_time(year, month - 1, day, hour, minute, 0, tz) {
        info.set_date(ts);
    }

    let name_field = fields.remainder().trim_start();
    if name_field.is_empty() || name_field.contains('/') {
        return ParseOutcome::Error;
    }
    info.set_name(name_field);

    ParseOutcome::Entry(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_directory_entry_uses_the_dir_marker() {
        let outcome = parse("      <DIR>  07-06-99  12:30  ProgFiles", time::UtcOffset::UTC);
        let ParseOutcome::Entry(info) = outcome else { panic!("expected an entry") };
        assert_eq!(info.name(), "ProgFiles");
        assert_eq!(info.file_type(), Some(FileType::Directory));
    }

    #[test]
    fn a_file_entry_parses_size_and_date() {
        let outcome = parse("      36828  07-06-99  12:30  zipdir", time::UtcOffset::UTC);
        let ParseOutcome::Entry(info) = outcome else { panic!("expected an entry") };
        assert_eq!(info.name(), "zipdir");
        assert_eq!(info.size(), Some(36828));
        let dt = time::OffsetDateTime::from_unix_timestamp(info.date().unwrap().unix_time).unwrap();
        assert_eq!(dt.year(), 1999);
    }

    #[test]
    fn a_line_missing_the_date_is_an_error() {
        assert!(matches!(parse("123", time::UtcOffset::UTC), ParseOutcome::Error));
    }
}
