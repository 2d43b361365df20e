//! Resource-store abstraction and textual duration/rate parsing.
//!
//! Every tunable (`net:limit-rate`, `net:timeout`, `net:reconnect-interval`)
//! is looked up by name and an optional closure — a qualifier that narrows
//! the value to one host or one protocol, mirroring how upstream resource
//! settings can be scoped to a site. [`ResourceStore`] is the trait the rest
//! of the workspace codes against; [`StaticResourceStore`] and
//! [`EnvResourceStore`] are the two concrete implementations used by tests
//! and simple embeddings respectively. A full interactive settings file is
//! out of scope here; `cli` owns parsing one and populating a
//! `StaticResourceStore` from it.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

/// A name/closure-scoped configuration source.
///
/// `closure` narrows a lookup to a specific host, protocol, or other
/// context; `None` means "the unscoped default". Implementations should
/// prefer an exact closure match over the unscoped value when both exist.
pub trait ResourceStore {
    /// Looks up the raw string value for `name`, optionally scoped by `closure`.
    fn query(&self, name: &str, closure: Option<&str>) -> Option<String>;

    /// Looks up a boolean value, accepting the same spellings as
    /// [`parse_bool`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBool`] if the stored value isn't a
    /// recognised boolean spelling.
    fn query_bool(&self, name: &str, closure: Option<&str>) -> Result<Option<bool>, ConfigError> {
        self.query(name, closure)
            .map(|raw| parse_bool(&raw))
            .transpose()
    }

    /// Looks up an integer value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInt`] if the stored value doesn't parse.
    fn query_i64(&self, name: &str, closure: Option<&str>) -> Result<Option<i64>, ConfigError> {
        self.query(name, closure)
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| ConfigError::InvalidInt(raw))
            })
            .transpose()
    }

    /// Looks up a duration value using the grammar accepted by [`parse_duration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDuration`] if the stored value doesn't parse.
    fn query_duration(
        &self,
        name: &str,
        closure: Option<&str>,
    ) -> Result<Option<Duration>, ConfigError> {
        self.query(name, closure)
            .map(|raw| parse_duration(&raw))
            .transpose()
    }

    /// Looks up a transfer-rate value in bytes/second using the grammar
    /// accepted by [`parse_rate`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRate`] if the stored value doesn't parse.
    fn query_rate(&self, name: &str, closure: Option<&str>) -> Result<Option<u64>, ConfigError> {
        self.query(name, closure)
            .map(|raw| parse_rate(&raw))
            .transpose()
    }
}

/// Error returned by the typed [`ResourceStore`] accessors.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The stored value wasn't a recognised boolean spelling.
    #[error("invalid boolean value: {0:?}")]
    InvalidBool(String),
    /// The stored value wasn't a valid integer.
    #[error("invalid integer value: {0:?}")]
    InvalidInt(String),
    /// The stored value didn't match the duration grammar.
    #[error("invalid duration value: {0:?}")]
    InvalidDuration(String),
    /// The stored value didn't match the rate grammar.
    #[error("invalid rate value: {0:?}")]
    InvalidRate(String),
}

/// Parses a boolean the way upstream resource values do: `yes`/`true`/`on`/`1`
/// for true, `no`/`false`/`off`/`0` for false, case-insensitively.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBool`] for any other spelling.
pub fn parse_bool(raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Ok(true),
        "no" | "false" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool(raw.to_string())),
    }
}

/// Parses a duration written as a sequence of `<number><unit>` pairs (e.g.
/// `"1h30m"`, `"250ms"`, `"45s"`) or the literal `"infinity"`/`"inf"`, which
/// maps to [`Duration::MAX`].
///
/// Recognised units: `ms`, `s`, `m`, `h`, `d`. A bare number is interpreted
/// as whole seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDuration`] if the string is empty, has an
/// unrecognised unit, or has a non-numeric component.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("infinity") || trimmed.eq_ignore_ascii_case("inf") {
        return Ok(Duration::MAX);
    }
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidDuration(raw.to_string()));
    }

    let mut total = Duration::ZERO;
    let bytes = trimmed.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        let num_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
            i += 1;
        }
        if i == num_start {
            return Err(ConfigError::InvalidDuration(raw.to_string()));
        }
        let number: f64 = trimmed[num_start..i]
            .parse()
            .map_err(|_| ConfigError::InvalidDuration(raw.to_string()))?;

        let unit_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let unit = &trimmed[unit_start..i];
        let seconds = match unit {
            "" | "s" => number,
            "ms" => number / 1000.0,
            "m" => number * 60.0,
            "h" => number * 3600.0,
            "d" => number * 86400.0,
            _ => return Err(ConfigError::InvalidDuration(raw.to_string())),
        };
        total += Duration::from_secs_f64(seconds.max(0.0));
    }

    Ok(total)
}

/// Parses a transfer rate written as `<number>[k|m|g]` bytes/second (e.g.
/// `"1.5m"` for 1.5 MB/s), or `"0"`/`"unlimited"`/`"inf"` for no limit
/// (returned as `u64::MAX`).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRate`] if the numeric part doesn't parse or
/// the suffix isn't one of `k`, `m`, `g` (case-insensitive).
pub fn parse_rate(raw: &str) -> Result<u64, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("unlimited") || trimmed.eq_ignore_ascii_case("inf") {
        return Ok(u64::MAX);
    }

    let (number_part, multiplier) = match trimmed.chars().last() {
        Some('k' | 'K') => (&trimmed[..trimmed.len() - 1], 1_000),
        Some('m' | 'M') => (&trimmed[..trimmed.len() - 1], 1_000_000),
        Some('g' | 'G') => (&trimmed[..trimmed.len() - 1], 1_000_000_000),
        _ => (trimmed, 1),
    };

    let number: f64 = number_part
        .parse()
        .map_err(|_| ConfigError::InvalidRate(raw.to_string()))?;
    if number < 0.0 {
        return Err(ConfigError::InvalidRate(raw.to_string()));
    }

    Ok((number * f64::from(multiplier)) as u64)
}

/// An in-memory [`ResourceStore`] backed by a plain map, keyed by
/// `(name, closure)`. Built for tests and for `cli` to populate from a
/// parsed settings file.
#[derive(Clone, Debug, Default)]
pub struct StaticResourceStore {
    values: HashMap<(String, Option<String>), String>,
}

impl StaticResourceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` (optionally scoped by `closure`) to `value`, overwriting
    /// any previous value for the same key.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        closure: Option<&str>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.values
            .insert((name.into(), closure.map(str::to_string)), value.into());
        self
    }
}

impl ResourceStore for StaticResourceStore {
    fn query(&self, name: &str, closure: Option<&str>) -> Option<String> {
        if let Some(c) = closure {
            if let Some(v) = self.values.get(&(name.to_string(), Some(c.to_string()))) {
                return Some(v.clone());
            }
        }
        self.values.get(&(name.to_string(), None)).cloned()
    }
}

/// A [`ResourceStore`] that reads from process environment variables.
///
/// `name` is upper-cased and every non-alphanumeric character replaced with
/// `_`, then prefixed; `closure`, if present, is appended the same way
/// separated by another `_`. For example with prefix `"XFER_"`, querying
/// `"net:limit-rate"` scoped to `"example.com"` reads
/// `XFER_NET_LIMIT_RATE_EXAMPLE_COM`, falling back to
/// `XFER_NET_LIMIT_RATE` if the scoped variable is unset.
#[derive(Clone, Debug)]
pub struct EnvResourceStore {
    prefix: &'static str,
}

impl EnvResourceStore {
    /// Creates a store that reads variables under `prefix`.
    #[must_use]
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    fn env_key(&self, name: &str, closure: Option<&str>) -> String {
        let mut key = String::with_capacity(self.prefix.len() + name.len() + 16);
        key.push_str(self.prefix);
        push_shouty(&mut key, name);
        if let Some(c) = closure {
            key.push('_');
            push_shouty(&mut key, c);
        }
        key
    }
}

fn push_shouty(out: &mut String, s: &str) {
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push('_');
        }
    }
}

impl ResourceStore for EnvResourceStore {
    fn query(&self, name: &str, closure: Option<&str>) -> Option<String> {
        if closure.is_some() {
            if let Ok(v) = env::var(self.env_key(name, closure)) {
                return Some(v);
            }
        }
        env::var(self.env_key(name, None)).ok()
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
