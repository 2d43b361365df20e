use std::fmt;
use std::str::FromStr;

/// Subsystem that produced a [`Message`](crate::message::Message).
///
/// Mirrors the way upstream lftp's diagnostics are implicitly tagged by which
/// object produced them (`Ftp::SetError`, a `Job`'s own error path, the
/// resolver); making the tag explicit keeps logs and test assertions from
/// having to parse free text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    /// The cooperative scheduler or a task's own lifecycle.
    Scheduler,
    /// The control-protocol session (§4.5 of the core design).
    Session,
    /// The data-channel negotiator.
    DataChannel,
    /// A directory listing parser or the lister.
    Listing,
    /// The glob engine.
    Glob,
    /// The transfer engine (copy job).
    Transfer,
    /// A job in the queue/job tree.
    Job,
    /// The DNS resolver.
    Resolver,
}

impl Role {
    /// All roles in the order they are introduced by the core design.
    pub const ALL: [Self; 8] = [
        Self::Scheduler,
        Self::Session,
        Self::DataChannel,
        Self::Listing,
        Self::Glob,
        Self::Transfer,
        Self::Job,
        Self::Resolver,
    ];

    /// Returns the lowercase identifier rendered in message trailers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduler => "scheduler",
            Self::Session => "session",
            Self::DataChannel => "data-channel",
            Self::Listing => "listing",
            Self::Glob => "glob",
            Self::Transfer => "transfer",
            Self::Job => "job",
            Self::Resolver => "resolver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Role`] from a string fails.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseRoleError {
    _private: (),
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unrecognised message role")
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "scheduler" => Ok(Self::Scheduler),
            "session" => Ok(Self::Session),
            "data-channel" => Ok(Self::DataChannel),
            "listing" => Ok(Self::Listing),
            "glob" => Ok(Self::Glob),
            "transfer" => Ok(Self::Transfer),
            "job" => Ok(Self::Job),
            "resolver" => Ok(Self::Resolver),
            _ => Err(ParseRoleError { _private: () }),
        }
    }
}
