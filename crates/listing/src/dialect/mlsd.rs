//! MLSD: `fact=value;fact=value; name`
//!
//! ```text
//! Type=cdir;Modify=20021029173810;Perm=el;Unique=BP8AAjJufAA; /
//! Type=dir;Modify=20010118144705;Perm=e;Unique=BP8AAjNufAA; bin
//! Type=file;Size=12303;Modify=19970124132601;Perm=r;Unique=BP8AAo9ufAA; mailserv.FAQ
//! ```

use super::ParseOutcome;
use crate::file_info::{FileInfo, FileType};

pub fn parse(line: &str, _tz: time::UtcOffset) -> ParseOutcome {
    let mut size: Option<u64> = None;
    let mut date: Option<i64> = None;
    let mut dir = false;
    let mut type_known = false;
    let mut perms: Option<u32> = None;
    let mut name: Option<&str> = None;

    for token in line.split(';') {
        if let Some(rest) = token.strip_prefix(' ') {
            name = Some(rest);
            break;
        }
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "type" => {
                let v = value.to_ascii_lowercase();
                if v == "cdir" || v == "pdir" || v == "dir" {
                    dir = true;
                    type_known = true;
                } else if v == "file" {
                    dir = false;
                    type_known = true;
                }
            }
            "modify" => {
                if let Some(ts) = parse_mlsd_timestamp(value) {
                    date = Some(ts);
                }
            }
            "size" => {
                if let Ok(v) = value.parse::<u64>() {
                    size = Some(v);
                }
            }
            "perm" => {
                let mut mode = 0u32;
                for c in value.chars() {
                    match c.to_ascii_lowercase() {
                        'e' => mode |= 0o111,
                        'l' | 'r' => mode |= 0o444,
                        'c' | 'w' => mode |= 0o200,
                        _ => {}
                    }
                }
                perms = Some(mode);
            }
            _ => {}
        }
    }

    let (Some(name), true) = (name, type_known) else {
        return ParseOutcome::Error;
    };

    let mut info = FileInfo::new(name);
    if let Some(s) = size {
        info.set_size(s);
    }
    if let Some(d) = date {
        info.set_date(d);
    }
    info.set_type(if dir { FileType::Directory } else { FileType::Normal });
    if let Some(p) = perms {
        info.set_mode(p);
    }
    ParseOutcome::Entry(info)
}

/// Parses an MLST/MLSD `Modify=YYYYMMDDHHMMSS[.sss]` fact into a Unix
/// timestamp, treating the value as UTC per RFC 3659.
fn parse_mlsd_timestamp(value: &str) -> Option<i64> {
    let digits = value.split('.').next().unwrap_or(value);
    if digits.len() < 14 {
        return None;
    }
    let year: i32 = digits[0..4].parse().ok()?;
    let month: u8 = digits[4..6].parse().ok()?;
    let day: u8 = digits[6..8].parse().ok()?;
    let hour: u8 = digits[8..10].parse().ok()?;
    let minute: u8 = digits[10..12].parse().ok()?;
    let second: u8 = digits[12..14].parse().ok()?;
    let date = time::Date::from_calendar_date(year, time::Month::try_from(month).ok()?, day).ok()?;
    let time_of_day = time::Time::from_hms(hour, minute, second).ok()?;
    Some(date.with_time(time_of_day).assume_utc().unix_timestamp())
}
