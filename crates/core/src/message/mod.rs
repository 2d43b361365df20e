//! Diagnostic message formatting shared across the workspace.
//!
//! Every subsystem that surfaces a user-visible diagnostic (a failed job, a
//! protocol error, a transfer abort) builds one of these rather than writing
//! ad-hoc `format!` strings, so severity, originating subsystem, and source
//! location stay consistent end to end.

mod message_impl;
mod role;
mod severity;
mod source;


pub use message_impl::Message;
pub use role::{ParseRoleError, Role};
pub use severity::{ParseSeverityError, Severity};
pub use source::SourceLocation;

/// Captures the caller's source location as a [`SourceLocation`].
///
/// # Examples
///
/// ```
/// use xfer_core::message_source;
///
/// let loc = message_source!();
/// assert!(loc.to_string().contains(file!()));
/// ```
#[macro_export]
macro_rules! message_source {
    () => {
        $crate::message::SourceLocation::new(file!(), line!())
    };
}
