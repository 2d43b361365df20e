//! DOS-style long listing: `MM-DD-YY HH:MM(AM|PM) (<DIR>|size) name`.
//!
//! ```text
//! 07-13-98  09:06PM       <DIR>          aix
//! 03-18-98  06:01AM              2109440 nlxb318e.tar
//! ```

use super::ParseOutcome;
use super::common::{FieldCursor, make_unix_time};
use crate::file_info::{FileInfo, FileType};

pub fn parse(line: &str, tz: time::UtcOffset) -> ParseOutcome {
    let mut fields = FieldCursor::new(line);

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
    if time_token.len() < 6 {
        return ParseOutcome::Error;
    }
    let am_pm = time_token.as_bytes()[time_token.len() - 2];
    let clock = &time_token[..time_token.len() - 2];
    let Some((hour_s, minute_s)) = clock.split_once(':') else {
        return ParseOutcome::Error;
    };
    let (Ok(mut hour), Ok(minute)) = (hour_s.parse::<u32>(), minute_s.parse::<u32>()) else {
        return ParseOutcome::Error;
    };
    if am_pm == b'P' {
        hour += 12;
        if hour == 24 {
            hour = 0;
        }
    }

    let Some(size_or_dir) = fields.next_field() else {
        return ParseOutcome::Error;
    };

    let mut info = FileInfo::new("");
    if size_or_dir == "<DIR>" {
        info.set_type(FileType::Directory);
    } else {
        info.set_type(FileType::Normal);
        let Ok(size) = size_or_dir.parse::<u64>() else {
            return ParseOutcome::Error;
        };
        info.set_size(size);
    }

    if let Some(ts) = make_unix_time(year, month - 1, day, hour, minute, 30, tz) {
        info.set_date(ts);
    }

    let name_field = fields.remainder().trim_start();
    if name_field.is_empty() {
        return ParseOutcome::Error;
    }
    info.set_name(name_field);
    if info.name().contains('/') {
        return ParseOutcome::Error;
    }

    ParseOutcome::Entry(info)
}
