//! The control-protocol session: ties state, the reply queue, feature
//! discovery, and restart bookkeeping into one driveable unit.

use std::collections::VecDeque;
use std::net::SocketAddr;

use xfer_core::message::{Message, Role};
use xfer_core::scheduler::{Status, Task};

use crate::data_channel::{parse_epsv_reply, parse_pasv_reply, DataChannelMode};
use crate::error::ReplyError;
use crate::features::FeatureSet;
use crate::reply::{Reply, ReplyClass, ReplyParser};
use crate::response_queue::{CheckCase, ExpectedResponse, ResponseQueue};
use crate::restart::RestartTracker;
use crate::state::SessionState;

/// A single FTP-style control-protocol session.
///
/// Owns the state machine, the pipelined reply queue, discovered features,
/// and restart history. Transport is injected: callers feed complete lines
/// read off the control connection to [`Session::feed_control_line`] and
/// drain commands to send with [`Session::take_outgoing`]; `Session` itself
/// never touches a socket, so it can be driven by a real connection (owned
/// by `cli`) or by a test double with no I/O at all.
pub struct Session {
    host: String,
    state: SessionState,
    queue: ResponseQueue,
    features: FeatureSet,
    restart: RestartTracker,
    parser: ReplyParser,
    outgoing: VecDeque<String>,
    home: Option<String>,
    cwd: Option<String>,
    data_mode: Option<DataChannelMode>,
    data_address: Option<SocketAddr>,
    last_size: Option<u64>,
    last_error: Option<Message>,
}

impl Session {
    /// Creates a session for `host`, not yet connected.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            state: SessionState::Initial,
            queue: ResponseQueue::new(),
            features: FeatureSet::none(),
            restart: RestartTracker::new(),
            parser: ReplyParser::new(),
            outgoing: VecDeque::new(),
            home: None,
            cwd: None,
            data_mode: None,
            data_address: None,
            last_size: None,
            last_error: None,
        }
    }

    /// The session's coarse state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The discovered feature set.
    #[must_use]
    pub const fn features(&self) -> FeatureSet {
        self.features
    }

    /// The restart bookkeeping for this session's host.
    #[must_use]
    pub const fn restart(&self) -> &RestartTracker {
        &self.restart
    }

    /// Mutable access to the restart bookkeeping, for a caller seeding a
    /// session from a process-wide memoized-hosts cache.
    pub fn restart_mut(&mut self) -> &mut RestartTracker {
        &mut self.restart
    }

    /// The most recent fatal diagnostic, if any.
    #[must_use]
    pub const fn last_error(&self) -> Option<&Message> {
        self.last_error.as_ref()
    }

    /// The home directory reported by the server's `PWD` reply, if seen.
    #[must_use]
    pub fn home(&self) -> Option<&str> {
        self.home.as_deref()
    }

    /// The current working directory as tracked by the last successful `CWD`.
    #[must_use]
    pub fn cwd(&self) -> Option<&str> {
        self.cwd.as_deref()
    }

    /// The most recently negotiated data-channel mode.
    #[must_use]
    pub const fn data_mode(&self) -> Option<DataChannelMode> {
        self.data_mode
    }

    /// The most recently negotiated data-channel address.
    #[must_use]
    pub const fn data_address(&self) -> Option<SocketAddr> {
        self.data_address
    }

    /// Drains commands queued to send on the control connection, each
    /// without a trailing CRLF (the transport appends line endings).
    pub fn take_outgoing(&mut self) -> Vec<String> {
        self.outgoing.drain(..).collect()
    }

    fn send(&mut self, command: impl Into<String>, expect: u16, check: CheckCase) {
        self.outgoing.push_back(command.into());
        self.queue.push(ExpectedResponse::new(expect, check));
    }

    fn send_with_path(
        &mut self,
        command: impl Into<String>,
        expect: u16,
        check: CheckCase,
        path: impl Into<String>,
    ) {
        self.outgoing.push_back(command.into());
        self.queue
            .push(ExpectedResponse::new(expect, check).with_path(path));
    }

    /// Marks the control socket as connecting.
    pub fn begin_connect(&mut self) {
        if self.state.can_transition_to(SessionState::Connecting) {
            self.state = SessionState::Connecting;
        }
    }

    /// Marks the control socket as connected and queues the expected `220`.
    pub fn control_connected(&mut self) {
        self.state = SessionState::Connected;
        self.queue.push(ExpectedResponse::new(220, CheckCase::Ready));
        tracing::debug!(host = %self.host, "control connection established");
    }

    /// Sends `USER` and transitions to waiting for its reply.
    pub fn send_user(&mut self, user: &str) {
        self.send(format!("USER {user}"), 331, CheckCase::User);
        self.state = SessionState::UserRespWaiting;
    }

    /// Sends `PASS`.
    pub fn send_pass(&mut self, pass: &str) {
        self.send(format!("PASS {pass}"), 230, CheckCase::Pass);
    }

    /// Sends `CWD` for `path` and transitions to waiting for its reply.
    pub fn send_cwd(&mut self, path: &str) {
        self.send_with_path(format!("CWD {path}"), 250, CheckCase::Cwd, path);
        self.state = SessionState::CwdCwdWaiting;
    }

    /// Sends `PWD`.
    pub fn send_pwd(&mut self) {
        self.send("PWD", 257, CheckCase::Pwd);
    }

    /// Sends `FEAT`.
    pub fn send_feat(&mut self) {
        self.send("FEAT", 211, CheckCase::Feat);
    }

    /// Sends `SIZE` for `path`.
    pub fn send_size(&mut self, path: &str) {
        self.send_with_path(format!("SIZE {path}"), 213, CheckCase::SizeOpt, path);
    }

    /// Sends `MDTM` for `path`.
    pub fn send_mdtm(&mut self, path: &str) {
        self.send_with_path(format!("MDTM {path}"), 213, CheckCase::MdtmOpt, path);
    }

    /// Sends `REST` with the given offset.
    pub fn send_rest(&mut self, offset: u64) {
        self.restart.rest_sent(offset);
        self.send(format!("REST {offset}"), 350, CheckCase::Rest);
    }

    /// Sends `PASV`.
    pub fn send_pasv(&mut self) {
        self.send("PASV", 227, CheckCase::Pasv);
    }

    /// Sends `EPSV`.
    pub fn send_epsv(&mut self) {
        self.send("EPSV", 229, CheckCase::Epsv);
    }

    /// Sends `TYPE I` (binary representation type).
    pub fn send_type_binary(&mut self) {
        self.send("TYPE I", 200, CheckCase::None);
    }

    /// Sends `RETR` for `path`. Queues both the `150` opening reply and the
    /// `226` closing reply the transfer eventually gets, so the reply FIFO
    /// stays accurate even though a data connection sits in between them.
    pub fn send_retr(&mut self, path: &str) {
        self.send_with_path(format!("RETR {path}"), 150, CheckCase::Transfer, path);
        self.queue.push(ExpectedResponse::new(226, CheckCase::TransferClosed).with_path(path));
        self.state = SessionState::Waiting;
    }

    /// Sends `STOR` for `path`; see [`Session::send_retr`] for the two-reply accounting.
    pub fn send_stor(&mut self, path: &str) {
        self.send_with_path(format!("STOR {path}"), 150, CheckCase::Transfer, path);
        self.queue.push(ExpectedResponse::new(226, CheckCase::TransferClosed).with_path(path));
        self.state = SessionState::Waiting;
    }

    /// Sends `LIST`, optionally for `path`; see [`Session::send_retr`] for
    /// the two-reply accounting.
    pub fn send_list(&mut self, path: Option<&str>) {
        let command = path.map_or_else(|| "LIST".to_string(), |p| format!("LIST {p}"));
        match path {
            Some(p) => {
                self.send_with_path(command, 150, CheckCase::Transfer, p);
                self.queue.push(ExpectedResponse::new(226, CheckCase::TransferClosed).with_path(p));
            }
            None => {
                self.send(command, 150, CheckCase::Transfer);
                self.queue.push(ExpectedResponse::new(226, CheckCase::TransferClosed));
            }
        }
        self.state = SessionState::Waiting;
    }

    /// Number of commands still awaiting a reply. A caller driving a
    /// `RETR`/`STOR`/`LIST` can treat this reaching zero (with no
    /// [`Session::last_error`]) as "the transfer's closing reply arrived".
    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.queue.len()
    }

    /// Feeds one line read off the control connection (CRLF already split
    /// off by the transport). Drives the state machine and reply queue
    /// forward when a complete reply is assembled.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError`] if the line can't be parsed as part of a
    /// well-formed reply.
    pub fn feed_control_line(&mut self, line: &str) -> Result<(), ReplyError> {
        if let Some(reply) = self.parser.feed_line(line)? {
            self.handle_reply(reply);
        }
        Ok(())
    }

    fn handle_reply(&mut self, reply: Reply) {
        let Some(expected) = self.queue.pop() else {
            return;
        };
        let class = if reply.code() == 530 {
            crate::reply::reclassify_530(&reply)
        } else {
            reply.class()
        };

        match expected.check() {
            CheckCase::Ready => {
                if class == ReplyClass::Success {
                    self.state = SessionState::Connected;
                } else {
                    self.fail(&reply, expected.path());
                }
            }
            CheckCase::User => {
                if reply.code() == 230 {
                    self.state = SessionState::Eof;
                } else if class != ReplyClass::Intermediate {
                    self.fail(&reply, expected.path());
                }
            }
            CheckCase::Pass | CheckCase::PassProxy => {
                if class == ReplyClass::Success {
                    self.state = SessionState::Eof;
                } else {
                    self.fail(&reply, expected.path());
                }
            }
            CheckCase::Cwd | CheckCase::CwdCurr => {
                if class == ReplyClass::Success {
                    self.cwd = expected.path().map(str::to_string);
                    self.state = SessionState::Eof;
                } else {
                    self.fail(&reply, expected.path());
                }
            }
            CheckCase::CwdStale => {
                if class == ReplyClass::Success {
                    self.cwd = expected.path().map(str::to_string);
                }
                self.state = SessionState::Eof;
            }
            CheckCase::Pwd => {
                if class == ReplyClass::Success {
                    self.home = extract_quoted_path(&reply.text());
                }
            }
            CheckCase::Feat => {
                if class == ReplyClass::Success {
                    let mut observed = FeatureSet::none();
                    for line in reply.lines() {
                        observed.observe(line);
                    }
                    self.features.merge(observed);
                }
            }
            CheckCase::SizeOpt => {
                if reply.code() == 213 {
                    self.last_size = reply.text().trim().parse::<u64>().ok();
                }
            }
            CheckCase::MdtmOpt => {}
            CheckCase::Rest => {
                if class == ReplyClass::Success || reply.code() == 350 {
                    self.restart.rest_accepted();
                } else {
                    self.restart.mark_norest_host(self.host.clone());
                }
            }
            CheckCase::Pasv => {
                if reply.code() == 227 {
                    if let Ok(addr) = parse_pasv_reply(&reply.text()) {
                        self.data_address = Some(addr);
                        self.data_mode = Some(DataChannelMode::Passive);
                    }
                } else {
                    self.fail(&reply, expected.path());
                }
            }
            CheckCase::Epsv => {
                if reply.code() == 229 {
                    if let Ok(port) = parse_epsv_reply(&reply.text()) {
                        self.data_mode = Some(DataChannelMode::Passive);
                        if let Some(existing) = self.data_address {
                            self.data_address = Some(SocketAddr::new(existing.ip(), port));
                        }
                    }
                } else {
                    self.fail(&reply, expected.path());
                }
            }
            CheckCase::Port => {
                if class != ReplyClass::Success {
                    self.fail(&reply, expected.path());
                }
            }
            CheckCase::Transfer | CheckCase::TransferClosed => {
                if class == ReplyClass::Success || class == ReplyClass::Preliminary {
                    self.state = SessionState::DataOpen;
                } else if matches!(
                    class,
                    ReplyClass::TransientNegative | ReplyClass::PermanentNegative
                ) {
                    self.fail(&reply, expected.path());
                    self.state = SessionState::Eof;
                } else {
                    self.state = SessionState::Eof;
                }
            }
            _ => {
                if matches!(
                    class,
                    ReplyClass::TransientNegative | ReplyClass::PermanentNegative
                ) {
                    self.fail(&reply, expected.path());
                }
            }
        }
    }

    fn fail(&mut self, reply: &Reply, path: Option<&str>) {
        let mut message = Message::error(i32::from(reply.code()), reply.text())
            .with_role(Role::Session);
        if let Some(path) = path {
            message = message.with_context(path);
        }
        tracing::warn!(host = %self.host, code = reply.code(), path, "session command failed");
        self.last_error = Some(message);
    }

    /// The size most recently reported by a `SIZE` command.
    #[must_use]
    pub const fn last_size(&self) -> Option<u64> {
        self.last_size
    }

    /// The session's host, as given at construction.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }
}

fn extract_quoted_path(text: &str) -> Option<String> {
    let start = text.find('"')? + 1;
    let rest = &text[start..];
    let end = rest.find('"')?;
    Some(rest[..end].replace("\"\"", "\""))
}

impl Task for Session {
    fn step(&mut self) -> Status {
        Status::Stall
    }

    fn reconfigure(&mut self, _name: Option<&str>) {}

    fn log_context(&self) -> Option<&str> {
        Some(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in_session() -> Session {
        let mut session = Session::new("ftp.example.com");
        session.begin_connect();
        session.control_connected();
        session.feed_control_line("220 Ready\r").unwrap();
        session.send_user("anonymous");
        session.feed_control_line("331 Please specify password\r").unwrap();
        session.send_pass("anon@");
        session.feed_control_line("230 Logged in\r").unwrap();
        session
    }

    #[test]
    fn login_sequence_reaches_eof_state() {
        let session = logged_in_session();
        assert_eq!(session.state(), SessionState::Eof);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn cwd_updates_tracked_directory() {
        let mut session = logged_in_session();
        session.send_cwd("/pub");
        session.feed_control_line("250 Directory changed\r").unwrap();
        assert_eq!(session.cwd(), Some("/pub"));
        assert_eq!(session.state(), SessionState::Eof);
    }

    #[test]
    fn cwd_failure_records_the_path_that_failed() {
        let mut session = logged_in_session();
        session.send_cwd("/missing");
        session.feed_control_line("550 No such directory\r").unwrap();
        assert!(session.cwd().is_none());
        let error = session.last_error().unwrap();
        assert_eq!(error.text(), "No such directory");
    }

    #[test]
    fn pwd_extracts_the_quoted_directory() {
        let mut session = logged_in_session();
        session.send_pwd();
        session
            .feed_control_line("257 \"/home/anonymous\" is the current directory\r")
            .unwrap();
        assert_eq!(session.home(), Some("/home/anonymous"));
    }

    #[test]
    fn feat_merges_discovered_features() {
        let mut session = logged_in_session();
        session.send_feat();
        session.feed_control_line("211-Features:\r").unwrap();
        session.feed_control_line(" MDTM\r").unwrap();
        session.feed_control_line(" SIZE\r").unwrap();
        session.feed_control_line(" REST STREAM\r").unwrap();
        session.feed_control_line("211 End\r").unwrap();
        assert!(session.features().mdtm());
        assert!(session.features().size());
        assert!(session.features().rest_stream());
    }

    #[test]
    fn pasv_reply_records_data_address() {
        let mut session = logged_in_session();
        session.send_pasv();
        session
            .feed_control_line("227 Entering Passive Mode (192,168,1,5,19,136)\r")
            .unwrap();
        let addr = session.data_address().unwrap();
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn rest_rejection_memoizes_the_host_as_norest() {
        let mut session = logged_in_session();
        session.send_rest(4096);
        session
            .feed_control_line("502 Command not implemented\r")
            .unwrap();
        assert!(session.restart().is_norest_host("ftp.example.com"));
        assert_eq!(session.restart().last_accepted(), 0);
    }

    #[test]
    fn rest_acceptance_updates_last_accepted_offset() {
        let mut session = logged_in_session();
        session.send_rest(8192);
        session.feed_control_line("350 Restarting at 8192\r").unwrap();
        assert_eq!(session.restart().last_accepted(), 8192);
    }

    #[test]
    fn size_reply_is_parsed_as_an_integer() {
        let mut session = logged_in_session();
        session.send_size("/pub/file.tar.gz");
        session.feed_control_line("213 104857600\r").unwrap();
        assert_eq!(session.last_size(), Some(104_857_600));
    }
}
