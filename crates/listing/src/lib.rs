//! # Overview
//!
//! Directory-listing support: the [`FileInfo`]/[`FileSet`] model, the six
//! raced long-listing dialect parsers plus the short-listing fallback,
//! the dialect race that picks a winner from mixed-format output, and the
//! `Lister` decision tree that turns "get info for one path" into CWD and
//! listing calls against a backend session.
//!
//! # Design
//!
//! Dialects are pure `&str -> ParseOutcome` functions with no session
//! dependency, so they're trivially unit-testable against literal listing
//! lines captured from real servers. [`race::DialectRace`] is the only
//! piece that's stateful, and it is fed one line per call so it composes
//! with a cooperative scheduler that wants to parse long listings without
//! blocking on any one of them.
//!
//! # See also
//!
//! [`glob`] for the pattern engine `Lister`'s include/exclude rules and
//! the generic recursive glob both build on.

pub mod dialect;
pub mod file_info;
pub mod lister;
pub mod race;

pub use dialect::{DIALECTS, Dialect, ParseOutcome};
pub use file_info::{FileDate, FileInfo, FileSet, FileType};
pub use lister::{IncludeRule, KnownShape, ListError, ListErrorKind, ListingBackend, get_file_info};
pub use race::DialectRace;
