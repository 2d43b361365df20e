//! Lister / GetFileInfo: turns "get info for one path" into CWD and
//! listing calls, with fall-backs for the common case where a parent
//! directory is readable but the leaf itself cannot be `CWD`'d into (or
//! the reverse).

use crate::file_info::{FileInfo, FileSet, FileType};
use crate::race::DialectRace;
use glob::{MatchFlags, fnmatch};

/// Whether a failure reported "no such file" (triggers the fall-back
/// strategy) or something else (propagated immediately).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListErrorKind {
    NoSuchFile,
    Other,
}

#[derive(Debug, Clone)]
pub struct ListError {
    pub kind: ListErrorKind,
    pub message: String,
}

impl ListError {
    #[must_use]
    pub fn no_such_file(message: impl Into<String>) -> Self {
        Self { kind: ListErrorKind::NoSuchFile, message: message.into() }
    }

    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self { kind: ListErrorKind::Other, message: message.into() }
    }
}

/// What the listing cache already knows about a path, letting
/// [`get_file_info`] skip the CWD probe entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownShape {
    Directory,
    File,
}

/// The session operations a `Lister` drives. Backed by a real protocol
/// session in production and by a fake in tests.
pub trait ListingBackend {
    /// `CWD` into `path`. On success, subsequent `list_lines` calls list
    /// the new working directory.
    fn chdir(&mut self, path: &str) -> Result<(), ListError>;

    /// Raw lines of the current working directory's long listing, not
    /// yet dialect-parsed.
    fn list_lines(&mut self) -> Result<Vec<String>, ListError>;

    /// A metadata-only probe (`GetInfoArray`-equivalent) for a handful of
    /// explicit paths, used when a directory listing of the parent
    /// doesn't contain the basename we're after (e.g. it's excluded, or
    /// the server doesn't report it in `LIST` but does on direct probe).
    fn get_info_array(&mut self, paths: &[&str]) -> Result<FileSet, ListError>;
}

/// An include/exclude rule evaluated in order against an entry's name;
/// the last matching rule wins, default is include.
pub struct IncludeRule {
    pub pattern: String,
    pub include: bool,
}

fn is_included(name: &str, rules: &[IncludeRule]) -> bool {
    let mut included = true;
    for rule in rules {
        if fnmatch(&rule.pattern, name, MatchFlags::default()) {
            included = rule.include;
        }
    }
    included
}

fn split_parent_and_basename(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    }
}

/// Lists `path` itself if it's a directory, or returns a one-item
/// [`FileSet`] describing `path` as a file if it's not.
pub fn get_file_info<B: ListingBackend>(
    backend: &mut B,
    path: &str,
    known: Option<KnownShape>,
    rules: &[IncludeRule],
    tz: time::UtcOffset,
) -> Result<FileSet, ListError> {
    if path == "/" {
        let mut set = FileSet::new();
        let mut root = FileInfo::new("/");
        root.set_type(FileType::Directory);
        set.add(root);
        return Ok(set);
    }

    match known {
        Some(KnownShape::Directory) => list_directory(backend, path, rules, tz),
        Some(KnownShape::File) => select_by_basename(backend, path, rules, tz),
        None => match backend.chdir(path) {
            Ok(()) => list_directory_here(backend, rules, tz),
            Err(e) if e.kind == ListErrorKind::NoSuchFile => {
                match select_by_basename(backend, path, rules, tz) {
                    Ok(set) => Ok(set),
                    Err(_) => probe_single(backend, path).map_err(|_| e),
                }
            }
            Err(e) => Err(e),
        },
    }
}

fn list_directory<B: ListingBackend>(backend: &mut B, path: &str, rules: &[IncludeRule], tz: time::UtcOffset) -> Result<FileSet, ListError> {
    backend.chdir(path)?;
    list_directory_here(backend, rules, tz)
}

fn list_directory_here<B: ListingBackend>(backend: &mut B, rules: &[IncludeRule], tz: time::UtcOffset) -> Result<FileSet, ListError> {
    let lines = backend.list_lines()?;
    let mut race = DialectRace::new(tz);
    for line in &lines {
        race.feed_line(line);
    }
    let (set, _dialect) = race.finish();
    let mut filtered = FileSet::new();
    for info in set {
        if is_included(info.name(), rules) {
            filtered.add(info);
        }
    }
    filtered.exclude_dots();
    Ok(filtered)
}

fn select_by_basename<B: ListingBackend>(backend: &mut B, path: &str, rules: &[IncludeRule], tz: time::UtcOffset) -> Result<FileSet, ListError> {
    let (parent, basename) = split_parent_and_basename(path);
    if basename.is_empty() {
        return Err(ListError::no_such_file(format!("{path}: no such file")));
    }
    backend.chdir(if parent.is_empty() { "." } else { parent })?;
    let listed = list_directory_here(backend, rules, tz)?;
    match listed.find_by_name(basename) {
        Some(info) => {
            let mut set = FileSet::new();
            set.add(info.clone());
            Ok(set)
        }
        None => Err(ListError::no_such_file(format!("{basename}: no such file in {parent}"))),
    }
}

fn probe_single<B: ListingBackend>(backend: &mut B, path: &str) -> Result<FileSet, ListError> {
    backend.get_info_array(&[path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeBackend {
        cwd: String,
        directories: HashMap<String, Vec<String>>,
        info: HashMap<String, FileSet>,
    }

    impl ListingBackend for FakeBackend {
        fn chdir(&mut self, path: &str) -> Result<(), ListError> {
            let resolved = if path == "." { self.cwd.clone() } else { path.to_string() };
            if self.directories.contains_key(&resolved) {
                self.cwd = resolved;
                Ok(())
            } else {
                Err(ListError::no_such_file(format!("{path}: no such file or directory")))
            }
        }

        fn list_lines(&mut self) -> Result<Vec<String>, ListError> {
            Ok(self.directories.get(&self.cwd).cloned().unwrap_or_default())
        }

        fn get_info_array(&mut self, paths: &[&str]) -> Result<FileSet, ListError> {
            let mut set = FileSet::new();
            for p in paths {
                if let Some(found) = self.info.get(*p) {
                    for info in found.iter() {
                        set.add(info.clone());
                    }
                } else {
                    return Err(ListError::no_such_file(format!("{p}: no such file")));
                }
            }
            Ok(set)
        }
    }

    #[test]
    fn a_directory_path_lists_its_children() {
        let mut backend = FakeBackend {
            cwd: String::new(),
            directories: HashMap::from([(
                "/pub".to_string(),
                vec!["-rw-r--r--   1 lav      root          100 Jan  1  2001 readme".to_string()],
            )]),
            info: HashMap::new(),
        };
        let set = get_file_info(&mut backend, "/pub", None, &[], time::UtcOffset::UTC).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.find_by_name("readme").unwrap().name(), "readme");
    }

    #[test]
    fn a_file_path_falls_back_to_listing_its_parent_and_selecting_the_basename() {
        let mut backend = FakeBackend {
            cwd: String::new(),
            directories: HashMap::from([(
                "/pub".to_string(),
                vec!["-rw-r--r--   1 lav      root          100 Jan  1  2001 readme".to_string()],
            )]),
            info: HashMap::new(),
        };
        let set = get_file_info(&mut backend, "/pub/readme", None, &[], time::UtcOffset::UTC).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.find_by_name("readme").unwrap().size(), Some(100));
    }

    #[test]
    fn a_missing_basename_falls_back_to_the_metadata_only_probe() {
        let mut backend = FakeBackend {
            cwd: String::new(),
            directories: HashMap::from([("/pub".to_string(), vec![])]),
            info: HashMap::from([("/pub/hidden".to_string(), {
                let mut set = FileSet::new();
                set.add(FileInfo::new("hidden"));
                set
            })]),
        };
        let set = get_file_info(&mut backend, "/pub/hidden", None, &[], time::UtcOffset::UTC).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn root_is_a_synthetic_directory() {
        let mut backend = FakeBackend { cwd: String::new(), directories: HashMap::new(), info: HashMap::new() };
        let set = get_file_info(&mut backend, "/", None, &[], time::UtcOffset::UTC).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.find_by_name("/").unwrap().file_type(), Some(FileType::Directory));
    }

    #[test]
    fn both_probes_failing_returns_the_saved_first_error() {
        let mut backend = FakeBackend { cwd: String::new(), directories: HashMap::new(), info: HashMap::new() };
        let err = get_file_info(&mut backend, "/nope/missing", None, &[], time::UtcOffset::UTC).unwrap_err();
        assert!(err.message.contains("nope"));
    }
}
