use std::fmt;

use super::{Role, Severity, SourceLocation};

/// A single user-visible diagnostic.
///
/// Renders as `<severity>: <text> (code N) [role=path]`, e.g.
/// `error: no such file (code 3) [session=ftp.example.com]`. The `path`
/// placeholder is whichever path (a remote path, a host, a job name) the
/// producing subsystem attached with [`Message::with_context`]; spec §7
/// requires that user-visible messages preserve the full path that
/// triggered them, so `context` is not optional sugar — callers that skip it
/// lose that requirement.
#[derive(Clone, Debug)]
pub struct Message {
    severity: Severity,
    code: i32,
    text: String,
    role: Option<Role>,
    context: Option<String>,
    source: Option<SourceLocation>,
}

impl Message {
    /// Creates an error-severity message with the given exit/result code.
    #[must_use]
    pub fn error(code: i32, text: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, text)
    }

    /// Creates a warning-severity message with code `0`.
    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, 0, text)
    }

    /// Creates an info-severity message with code `0`.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, 0, text)
    }

    fn new(severity: Severity, code: i32, text: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            text: text.into(),
            role: None,
            context: None,
            source: None,
        }
    }

    /// Attaches the subsystem that produced the message.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Attaches the path/host/job context that triggered the message.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attaches a captured [`SourceLocation`].
    #[must_use]
    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }

    /// The severity of the message.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// The numeric code (a [`crate::exit_code::ResultCode`] value, a protocol
    /// reply code, or `0` for non-error messages).
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// The free-text body of the message.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The attached context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)?;
        if self.code != 0 {
            write!(f, " (code {})", self.code)?;
        }
        if let Some(role) = self.role {
            match self.context.as_deref() {
                Some(ctx) => write!(f, " [{role}={ctx}]")?,
                None => write!(f, " [{role}]")?,
            }
        } else if let Some(ctx) = self.context.as_deref() {
            write!(f, " [{ctx}]")?;
        }
        if let Some(source) = self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Message {}
