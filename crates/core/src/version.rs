//! Version banner shared by `bin/xfer` and test harnesses.
//!
//! Keeping this in `xfer_core` rather than in the binary crate means every
//! integration test that needs to assert on a banner (e.g. a `--version`
//! golden test) can depend on the library crate alone.

use std::fmt;

/// The crate version, protocol revision, and build metadata reported by
/// `xfer --version` and logged once at session start.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Version {
    package: &'static str,
    package_version: &'static str,
    protocol_revision: u32,
}

/// The highest control-protocol revision this build understands.
///
/// Bumped when a wire-incompatible change lands in the session state
/// machine; sessions negotiate down to the lower of the two peers'
/// revisions during feature discovery.
pub const PROTOCOL_REVISION: u32 = 1;

impl Version {
    /// Builds the version banner for the running binary.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            package: env!("CARGO_PKG_NAME"),
            package_version: env!("CARGO_PKG_VERSION"),
            protocol_revision: PROTOCOL_REVISION,
        }
    }

    /// The crate's package name as declared in `Cargo.toml`.
    #[must_use]
    pub const fn package(&self) -> &'static str {
        self.package
    }

    /// The crate's package version as declared in `Cargo.toml`.
    #[must_use]
    pub const fn package_version(&self) -> &'static str {
        self.package_version
    }

    /// The control-protocol revision this build negotiates with.
    #[must_use]
    pub const fn protocol_revision(&self) -> u32 {
        self.protocol_revision
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (protocol {})",
            self.package, self.package_version, self.protocol_revision
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_contains_package_and_protocol() {
        let version = Version::current();
        let rendered = version.to_string();
        assert!(rendered.contains(version.package()));
        assert!(rendered.contains(version.package_version()));
        assert!(rendered.contains("protocol 1"));
    }
}
