//! EPLF: lines starting `+`, comma-separated fields with one-letter tags.
//!
//! ```text
//! +i774.71425,m951188401,/,	users
//! +i774.49602,m917883130,r,s79126,	jgr_www2.exe
//! ```
//!
//! Tags: `s` size, `m` mtime, `/` directory, `r` regular, `up` permissions
//! (octal), a literal tab marks the start of the trailing file name.

use super::ParseOutcome;
use crate::file_info::{FileInfo, FileType};

pub fn parse(line: &str, _tz: time::UtcOffset) -> ParseOutcome {
    if !line.starts_with('+') {
        return ParseOutcome::Error;
    }

    let mut size: Option<u64> = None;
    let mut date: Option<i64> = None;
    let mut dir = false;
    let mut type_known = false;
    let mut perms: Option<u32> = None;
    let mut name: Option<&str> = None;

    for field in line[1..].split(',') {
        if let Some(rest) = field.strip_prefix('\t') {
            name = Some(rest);
            break;
        }
        let Some(tag) = field.chars().next() else {
            continue;
        };
        let value = &field[tag.len_utf8()..];
        match tag {
            's' => {
                if let Ok(v) = value.parse::<u64>() {
                    size = Some(v);
                }
            }
            'm' => {
                if let Ok(v) = value.parse::<i64>() {
                    date = Some(v);
                }
            }
            '/' => {
                dir = true;
                type_known = true;
            }
            'r' => {
                dir = false;
                type_known = true;
            }
            'i' => {}
            'u' => {
                if let Some(oct) = value.strip_prefix('p') {
                    if let Ok(v) = u32::from_str_radix(oct, 8) {
                        perms = Some(v);
                    }
                }
            }
            _ => return ParseOutcome::Error,
        }
    }

    let Some(name) = name else {
        return ParseOutcome::Error;
    };

    let mut info = FileInfo::new(name);
    if let Some(s) = size {
        info.set_size(s);
    }
    if let Some(d) = date {
        info.set_date(d);
    }
    if type_known {
        info.set_type(if dir { FileType::Directory } else { FileType::Normal });
    }
    if let Some(p) = perms {
        info.set_mode(p);
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
    fn a_directory_entry_parses_mtime_and_name() {
        let outcome = parse("+i774.71425,m951188401,/,\tusers", time::UtcOffset::UTC);
        let ParseOutcome::Entry(info) = outcome else { panic!("expected an entry") };
        assert_eq!(info.name(), "users");
        assert_eq!(info.file_type(), Some(FileType::Directory));
        assert_eq!(info.date().unwrap().unix_time, 951_188_401);
    }

    #[test]
    fn a_regular_file_entry_parses_size() {
        let outcome = parse("+i774.49602,m917883130,r,s79126,\tjgr_www2.exe", time::UtcOffset::UTC);
        let ParseOutcome::Entry(info) = outcome else { panic!("expected an entry") };
        assert_eq!(info.name(), "jgr_www2.exe");
        assert_eq!(info.size(), Some(79126));
        assert_eq!(info.file_type(), Some(FileType::Normal));
    }

    #[test]
    fn a_line_not_starting_with_plus_is_rejected() {
        assert!(matches!(parse("not eplf", time::UtcOffset::UTC), ParseOutcome::Error));
    }
}
