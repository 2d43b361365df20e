//! Generic recursive glob: split the pattern at the last `/`, glob the
//! prefix (directories only) to get candidate directories, then list each
//! and filter children by the trailing pattern.
//!
//! This engine is agnostic of the directory-entry type: callers implement
//! [`Entry`] and [`DirLister`] so this crate never depends on a concrete
//! listing implementation (avoiding a dependency cycle with `listing`,
//! which depends on this crate for pattern matching).

use crate::fnmatch::{self, MatchFlags};

/// One directory entry as the glob engine needs to see it.
pub trait Entry {
    /// The entry's bare name (no directory component).
    fn name(&self) -> &str;
    /// Whether this entry is (or, for a symlink, may be) a directory.
    fn is_directory(&self) -> bool;
    /// Returns a copy of this entry with its name replaced.
    fn renamed(&self, name: String) -> Self;
    /// Builds a placeholder entry carrying only a name, used for a
    /// wildcard-free pattern that needs no directory listing at all.
    fn synthetic(name: String) -> Self;
}

/// Lists the children of one directory, the only I/O this engine performs.
pub trait DirLister<E: Entry> {
    /// Lists `dir`'s children, or fails with a server-reported message.
    fn list(&mut self, dir: &str) -> Result<Vec<E>, String>;
}

/// Matching mode for the engine's current glob level.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GlobOptions {
    pub dirs_only: bool,
    pub files_only: bool,
    pub match_flags: MatchFlags,
}

/// Expands `pattern` against `lister`, recursively globbing any directory
/// components that themselves contain wildcards.
pub fn recursive_glob<E: Entry + Clone>(
    pattern: &str,
    lister: &mut impl DirLister<E>,
    options: GlobOptions,
) -> Result<Vec<E>, String> {
    if pattern.is_empty() || !fnmatch::has_wildcards(pattern) {
        let unquoted = fnmatch::unquote_wildcards(pattern);
        return Ok(vec![E::synthetic(unquoted)]);
    }
    expand(pattern, lister, options)
}

fn expand<E: Entry + Clone>(pattern: &str, lister: &mut impl DirLister<E>, options: GlobOptions) -> Result<Vec<E>, String> {
    let (dir_part, name_pattern) = split_last_slash(pattern);

    let candidate_dirs: Vec<String> = match dir_part {
        None => vec![String::new()],
        Some(dir) if !fnmatch::has_wildcards(dir) => vec![dir.to_string()],
        Some(dir) => {
            let dir_options = GlobOptions {
                dirs_only: true,
                files_only: false,
                match_flags: options.match_flags,
            };
            let entries = expand(dir, lister, dir_options)?;
            entries.into_iter().map(|e| e.name().to_string()).collect()
        }
    };

    let mut results = Vec::new();
    for dir in candidate_dirs {
        let children = lister.list(if dir.is_empty() { "." } else { &dir })?;
        tracing::trace!(dir = %dir, pattern = name_pattern, matched = children.len(), "glob listed a candidate directory");
        for child in children {
            if child.name() == "." || child.name() == ".." {
                continue;
            }
            if options.dirs_only && !child.is_directory() {
                continue;
            }
            if options.files_only && child.is_directory() {
                continue;
            }
            if !fnmatch::fnmatch(name_pattern, child.name(), options.match_flags) {
                continue;
            }
            let full_name = join_dir(&dir, child.name());
            results.push(child.renamed(full_name));
        }
    }
    Ok(results)
}

fn split_last_slash(pattern: &str) -> (Option<&str>, &str) {
    match pattern.rfind('/') {
        None => (None, pattern),
        Some(0) => (Some("/"), &pattern[1..]),
        Some(idx) => (Some(&pattern[..idx]), &pattern[idx + 1..]),
    }
}

fn join_dir(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
