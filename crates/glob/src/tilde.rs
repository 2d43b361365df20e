//! Tilde handling ahead of glob expansion.
//!
//! A bare `~` (optionally followed by a non-wildcard path) expands eagerly
//! against the session's home directory. A `~` immediately followed by a
//! wildcard character is never expanded — the leading `~` is instead
//! rewritten to `./~` so the glob engine treats it as a literal filename
//! character rather than a would-be username reference.

use crate::fnmatch::has_wildcards;

/// What to do with a pattern's leading `~`, decided before globbing begins.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TildeDecision {
    /// No leading `~`; pass the pattern through unchanged.
    None,
    /// Expand eagerly: replace `~` (and `~user`) with `home`, before globbing.
    Expand { home: String, rest: String },
    /// Leave literal: rewrite to `./~...` so later matching treats `~` as
    /// an ordinary character instead of attempting expansion.
    Literal { rewritten: String },
}

/// Inspects `pattern`'s leading `~` and decides whether it should be
/// expanded against `home` or treated as a literal filename character.
///
/// Mirrors the original's rule: the wildcard check applies to the
/// characters up to (and not including) the first `/`, if any.
#[must_use]
pub fn decide(pattern: &str, home: &str) -> TildeDecision {
    if !pattern.starts_with('~') {
        return TildeDecision::None;
    }
    let head = pattern.split('/').next().unwrap_or(pattern);
    if has_wildcards(head) {
        return TildeDecision::Literal {
            rewritten: format!("./{pattern}"),
        };
    }
    let rest = pattern.strip_prefix(head).unwrap_or("").to_string();
    TildeDecision::Expand {
        home: home.to_string(),
        rest,
    }
}

/// Applies a [`TildeDecision`] to `pattern`, returning the pattern to
/// actually glob.
#[must_use]
pub fn apply(pattern: &str, decision: &TildeDecision) -> String {
    match decision {
        TildeDecision::None => pattern.to_string(),
        TildeDecision::Expand { home, rest } => format!("{home}{rest}"),
        TildeDecision::Literal { rewritten } => rewritten.clone(),
    }
}
