//! Populates a [`StaticResourceStore`] from a settings file, and layers it
//! over [`EnvResourceStore`] the way `core::config`'s module doc says this
//! crate should: a full interactive settings dialect is out of scope, but a
//! flat `key = value` file (one setting per line, `#` comments, optional
//! `name/closure = value` host-scoped form) is enough to drive `net:*`
//! tunables without an environment variable per host.

use std::fs;
use std::path::Path;

use xfer_core::config::{ResourceStore, StaticResourceStore};

/// Error loading a settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The file couldn't be read.
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A non-comment, non-blank line had no `=`.
    #[error("{path}:{line}: missing '=' in {text:?}")]
    MissingEquals { path: String, line: usize, text: String },
}

/// Reads `path` and returns a store populated from its `key = value` lines.
///
/// A key of the form `name/closure` scopes the value to `closure` (commonly
/// a hostname), matching `net:limit-rate/example.com = 500k`.
///
/// # Errors
///
/// Returns [`SettingsError`] if the file can't be read or a line is
/// malformed.
pub fn load(path: &Path) -> Result<StaticResourceStore, SettingsError> {
    let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut store = StaticResourceStore::new();
    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(SettingsError::MissingEquals {
                path: path.display().to_string(),
                line: lineno + 1,
                text: line.to_string(),
            });
        };
        let key = key.trim();
        let value = value.trim();
        match key.split_once('/') {
            Some((name, closure)) => {
                store.set(name.trim(), Some(closure.trim()), value);
            }
            None => {
                store.set(key, None, value);
            }
        }
    }
    Ok(store)
}

/// A [`ResourceStore`] that checks a primary source first and falls back to
/// a secondary one, mirroring how a settings file should take precedence
/// over ambient environment variables for the same name.
pub struct Layered<A, B> {
    primary: A,
    fallback: B,
}

impl<A: ResourceStore, B: ResourceStore> Layered<A, B> {
    /// Wraps `primary` (checked first) over `fallback`.
    pub const fn new(primary: A, fallback: B) -> Self {
        Self { primary, fallback }
    }
}

impl<A: ResourceStore, B: ResourceStore> ResourceStore for Layered<A, B> {
    fn query(&self, name: &str, closure: Option<&str>) -> Option<String> {
        self.primary
            .query(name, closure)
            .or_else(|| self.fallback.query(name, closure))
    }
}
