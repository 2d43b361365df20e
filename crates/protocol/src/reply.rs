//! Reply decoding: multi-line framing and status-code classification.

use crate::error::ReplyError;

/// A fully decoded control-protocol reply.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reply {
    code: u16,
    lines: Vec<String>,
}

impl Reply {
    /// The three-digit reply code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Every text line of the reply, in order, with the leading code and
    /// separator (`-` or ` `) stripped.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The full reply text with lines joined by `\n`, matching what a
    /// caller would want to show a user.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Classifies the reply's first digit per RFC 959/1123.
    #[must_use]
    pub fn class(&self) -> ReplyClass {
        ReplyClass::from_code(self.code)
    }
}

/// The five coarse reply classes, keyed on the reply code's first digit.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ReplyClass {
    /// `1xx`: the requested action is being initiated, expect another reply.
    Preliminary,
    /// `2xx`: the requested action succeeded.
    Success,
    /// `3xx`: the command was accepted but needs further information.
    Intermediate,
    /// `4xx`: a transient negative reply; the same command may succeed later.
    TransientNegative,
    /// `5xx`: a permanent negative reply; retrying the same command won't help.
    PermanentNegative,
}

impl ReplyClass {
    /// Classifies a raw reply code by its leading digit.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code / 100 {
            1 => Self::Preliminary,
            2 => Self::Success,
            3 => Self::Intermediate,
            4 => Self::TransientNegative,
            _ => Self::PermanentNegative,
        }
    }

    /// Reports whether a command that got this class of reply should be
    /// retried (possibly with backoff) rather than treated as fatal.
    ///
    /// `530` (login failed) is ordinarily permanent, but
    /// [`reclassify_530`] promotes it to transient when the reply text
    /// matches a known "try again" pattern (too many connections, server
    /// temporarily refusing logins), so this alone is not the final word on
    /// `530` specifically.
    #[must_use]
    pub const fn should_retry(self) -> bool {
        matches!(self, Self::TransientNegative)
    }
}

/// Phrases that indicate a nominally permanent `530` reply is actually a
/// transient condition (too many users, try again later).
const RETRYABLE_530_PATTERNS: &[&str] = &[
    "too many",
    "try again",
    "try later",
    "maximum number",
    "connection limit",
];

/// Reclassifies a `530` reply as [`ReplyClass::TransientNegative`] when its
/// text matches a known retry pattern, otherwise leaves it
/// [`ReplyClass::PermanentNegative`].
///
/// Only meaningful for code `530`; callers should consult
/// [`Reply::class`] for every other code.
#[must_use]
pub fn reclassify_530(reply: &Reply) -> ReplyClass {
    debug_assert_eq!(reply.code, 530);
    let text = reply.text().to_ascii_lowercase();
    if RETRYABLE_530_PATTERNS
        .iter()
        .any(|pattern| text.contains(pattern))
    {
        ReplyClass::TransientNegative
    } else {
        ReplyClass::PermanentNegative
    }
}

/// Accumulates bytes from a control connection into complete [`Reply`]
/// values, handling RFC 959 multi-line framing (`NNN-` intermediate lines
/// terminated by a `NNN ` line with the matching code) and stripping
/// trailing CR from CRLF line endings.
#[derive(Default)]
pub struct ReplyParser {
    pending: Vec<String>,
    open_code: Option<u16>,
}

impl ReplyParser {
    /// Creates an empty parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one already-newline-delimited line (CR, if present, is
    /// stripped by the caller's line splitter or here) into the parser.
    /// Returns a complete [`Reply`] once the line completes one, or `None`
    /// if more lines are needed.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Malformed`] if a line claiming to continue an
    /// open multi-line reply, or a line starting a new reply, doesn't begin
    /// with a three-digit code.
    pub fn feed_line(&mut self, raw: &str) -> Result<Option<Reply>, ReplyError> {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some(open) = self.open_code {
            if let Some((code, sep, rest)) = split_code(line) {
                if code == open && sep == ' ' {
                    self.pending.push(rest.to_string());
                    self.open_code = None;
                    let lines = std::mem::take(&mut self.pending);
                    return Ok(Some(Reply { code, lines }));
                }
            }
            self.pending.push(line.to_string());
            return Ok(None);
        }

        let (code, sep, rest) = split_code(line).ok_or_else(|| ReplyError::Malformed(line.to_string()))?;
        match sep {
            ' ' => Ok(Some(Reply {
                code,
                lines: vec![rest.to_string()],
            })),
            '-' => {
                self.open_code = Some(code);
                self.pending = vec![rest.to_string()];
                Ok(None)
            }
            _ => Err(ReplyError::Malformed(line.to_string())),
        }
    }

    /// Reports whether the parser is mid-way through a multi-line reply.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open_code.is_some()
    }
}

fn split_code(line: &str) -> Option<(u16, char, &str)> {
    if line.len() < 4 {
        return None;
    }
    let (code_str, rest) = line.split_at(3);
    let code = code_str.parse::<u16>().ok()?;
    let sep = rest.chars().next()?;
    Some((code, sep, &rest[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_reply_completes_immediately() {
        let mut parser = ReplyParser::new();
        let reply = parser.feed_line("220 Ready\r").unwrap().unwrap();
        assert_eq!(reply.code(), 220);
        assert_eq!(reply.lines(), ["Ready"]);
    }

    #[test]
    fn multiline_reply_accumulates_until_terminator() {
        let mut parser = ReplyParser::new();
        assert!(parser.feed_line("211-Features:").unwrap().is_none());
        assert!(parser.feed_line(" MDTM").unwrap().is_none());
        assert!(parser.feed_line(" SIZE").unwrap().is_none());
        let reply = parser.feed_line("211 End").unwrap().unwrap();
        assert_eq!(reply.code(), 211);
        assert_eq!(reply.lines(), [" Features:", " MDTM", " SIZE", "End"]);
        assert!(!parser.is_open());
    }

    #[test]
    fn malformed_leading_line_is_rejected() {
        let mut parser = ReplyParser::new();
        assert!(parser.feed_line("not a reply").is_err());
    }

    #[test]
    fn reply_class_covers_all_five_digit_groups() {
        assert_eq!(ReplyClass::from_code(150), ReplyClass::Preliminary);
        assert_eq!(ReplyClass::from_code(226), ReplyClass::Success);
        assert_eq!(ReplyClass::from_code(350), ReplyClass::Intermediate);
        assert_eq!(ReplyClass::from_code(426), ReplyClass::TransientNegative);
        assert_eq!(ReplyClass::from_code(550), ReplyClass::PermanentNegative);
    }

    #[test]
    fn login_failure_reclassifies_when_text_says_try_again() {
        let mut parser = ReplyParser::new();
        let reply = parser
            .feed_line("530 Too many users logged in, try again later\r")
            .unwrap()
            .unwrap();
        assert_eq!(reply.class(), ReplyClass::PermanentNegative);
        assert_eq!(reclassify_530(&reply), ReplyClass::TransientNegative);
    }

    #[test]
    fn login_failure_stays_permanent_without_a_retry_phrase() {
        let mut parser = ReplyParser::new();
        let reply = parser
            .feed_line("530 Login incorrect\r")
            .unwrap()
            .unwrap();
        assert_eq!(reclassify_530(&reply), ReplyClass::PermanentNegative);
    }
}
