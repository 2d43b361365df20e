//! [`jobs::Job`] implementations: a `get`/`put` copy driven by
//! [`transfer::CopyEngine`], and an `ls` listing driven by `listing`'s
//! dialect race.

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use io::translator::Passthrough;
use jobs::{DoStatus, Job};
use listing::race::DialectRace;
use protocol::session::Session;
use transfer::{CopyEngine, RateLimiter, TransferError, Verifier};
use xfer_core::exit_code::{HasResultCode, JobExitCode};
use xfer_core::scheduler::Status;

use crate::handshake::Login;
use crate::transport::{ControlConnection, FileSink, FileSource, TcpSink, TcpSource};

/// Guards a negotiated `PASV`/`EPSV` address against an `FTP bounce` style
/// redirection before dialing it: the address must match the control
/// connection's own peer, and the port must match what was advertised.
fn check_data_address(control: &ControlConnection, addr: std::net::SocketAddr) -> std::io::Result<()> {
    let control_peer = control.peer_addr()?.ip();
    if !protocol::data_channel::data_address_ok(addr, control_peer, addr.port(), true, true) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("data address {addr} does not match control connection peer {control_peer}"),
        ));
    }
    Ok(())
}

/// Which way bytes move relative to the local filesystem.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Remote to local (`RETR`).
    Get,
    /// Local to remote (`STOR`).
    Put,
}

#[derive(Debug)]
enum Phase {
    LoggingIn,
    AwaitingSizeReply,
    AwaitingRestReply,
    AwaitingPasvReply,
    Copying,
    Draining,
    Done,
}

/// A single `get`/`put` transfer job, driving the control-connection login
/// and data-channel negotiation itself and delegating the byte copy to a
/// [`transfer::CopyEngine`] once the data connection is open.
pub struct TransferJob {
    direction: Direction,
    control: ControlConnection,
    session: Session,
    login: Login,
    phase: Phase,
    user: String,
    password: String,
    remote_path: String,
    local_path: PathBuf,
    restart: bool,
    offset: u64,
    verify: Option<checksums::strong::VerifyAlgorithm>,
    rate_limit: Option<std::num::NonZeroU64>,
    copy: Option<CopyEngine<Passthrough>>,
    exit_code: JobExitCode,
    failure: Option<String>,
}

impl TransferJob {
    /// Connects to `addr` and prepares a transfer. The TCP control
    /// connection is opened synchronously here (a one-time setup cost, not
    /// part of the cooperative step loop); every step afterward is
    /// non-blocking.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`std::io::Error`] if the control connection
    /// can't be established.
    pub fn new(
        addr: SocketAddr,
        host: &str,
        user: &str,
        password: &str,
        direction: Direction,
        remote_path: String,
        local_path: PathBuf,
        restart: bool,
        verify: Option<checksums::strong::VerifyAlgorithm>,
        rate_limit: Option<std::num::NonZeroU64>,
    ) -> std::io::Result<Self> {
        let control = ControlConnection::connect(addr)?;
        let mut session = Session::new(host);
        session.begin_connect();
        session.control_connected();

        Ok(Self {
            direction,
            control,
            session,
            login: Login::new(),
            phase: Phase::LoggingIn,
            user: user.to_string(),
            password: password.to_string(),
            remote_path,
            local_path,
            restart,
            offset: 0,
            verify,
            rate_limit,
            copy: None,
            exit_code: JobExitCode::Success,
            failure: None,
        })
    }

    fn poll_control(&mut self) {
        match self.control.poll() {
            Ok(lines) => {
                for line in lines {
                    if let Err(e) = self.session.feed_control_line(&line) {
                        self.fail(format!("malformed reply: {e}"));
                        return;
                    }
                }
            }
            Err(e) => self.fail(format!("control connection: {e}")),
        }
        if let Some(msg) = self.session.last_error() {
            self.fail(msg.text().to_string());
        }
    }

    fn fail(&mut self, reason: String) {
        if self.failure.is_none() {
            tracing::warn!(reason = %reason, "transfer job failed");
            self.failure = Some(reason);
            self.exit_code = JobExitCode::Fatal;
            self.phase = Phase::Done;
        }
    }

    fn open_data_connection(&mut self) -> std::io::Result<(TcpSource, TcpSink)> {
        let addr = self.session.data_address().expect("PASV address negotiated before opening data connection");
        check_data_address(&self.control, addr)?;
        let stream = std::net::TcpStream::connect(addr)?;
        let source_stream = stream.try_clone()?;
        Ok((TcpSource::new(source_stream)?, TcpSink::new(stream)?))
    }
}

impl Job for TransferJob {
    fn do_step(&mut self) -> DoStatus {
        if matches!(self.phase, Phase::Done) {
            return DoStatus::Stall;
        }

        self.poll_control();
        if matches!(self.phase, Phase::Done) {
            return DoStatus::Moved;
        }

        match self.phase {
            Phase::LoggingIn => {
                if self.login.step(&mut self.session, &self.user, &self.password) {
                    match (self.direction, self.restart) {
                        (Direction::Put, true) => {
                            self.session.send_size(&self.remote_path);
                            self.phase = Phase::AwaitingSizeReply;
                        }
                        (Direction::Get, true) => {
                            self.offset = fs::metadata(&self.local_path).map(|m| m.len()).unwrap_or(0);
                            if self.offset > 0 {
                                self.session.send_rest(self.offset);
                                self.phase = Phase::AwaitingRestReply;
                            } else {
                                self.session.send_pasv();
                                self.phase = Phase::AwaitingPasvReply;
                            }
                        }
                        (_, false) => {
                            self.session.send_pasv();
                            self.phase = Phase::AwaitingPasvReply;
                        }
                    }
                    return DoStatus::Moved;
                }
                DoStatus::Stall
            }
            Phase::AwaitingSizeReply => {
                if self.session.pending_replies() == 0 {
                    self.offset = self.session.last_size().unwrap_or(0);
                    if self.offset > 0 {
                        self.session.send_rest(self.offset);
                        self.phase = Phase::AwaitingRestReply;
                    } else {
                        self.session.send_pasv();
                        self.phase = Phase::AwaitingPasvReply;
                    }
                    return DoStatus::Moved;
                }
                DoStatus::Stall
            }
            Phase::AwaitingRestReply => {
                if self.session.pending_replies() == 0 {
                    self.session.send_pasv();
                    self.phase = Phase::AwaitingPasvReply;
                    return DoStatus::Moved;
                }
                DoStatus::Stall
            }
            Phase::AwaitingPasvReply => {
                if self.session.pending_replies() == 0 && self.session.data_address().is_some() {
                    let (tcp_source, tcp_sink) = match self.open_data_connection() {
                        Ok(pair) => pair,
                        Err(e) => {
                            self.fail(format!("data connection: {e}"));
                            return DoStatus::Moved;
                        }
                    };
                    let mut engine = match self.direction {
                        Direction::Get => {
                            let sink = match FileSink::create(&self.local_path, (self.offset > 0).then_some(self.offset)) {
                                Ok(sink) => sink,
                                Err(e) => {
                                    self.fail(format!("opening {}: {e}", self.local_path.display()));
                                    return DoStatus::Moved;
                                }
                            };
                            self.session.send_retr(&self.remote_path);
                            CopyEngine::new(Box::new(tcp_source), Box::new(sink), Passthrough, self.offset)
                        }
                        Direction::Put => {
                            let source = match FileSource::open(&self.local_path) {
                                Ok(source) => source,
                                Err(e) => {
                                    self.fail(format!("opening {}: {e}", self.local_path.display()));
                                    return DoStatus::Moved;
                                }
                            };
                            self.session.send_stor(&self.remote_path);
                            CopyEngine::new(Box::new(source), Box::new(tcp_sink), Passthrough, self.offset)
                        }
                    };
                    if let Some(algorithm) = self.verify {
                        engine.enable_verify(Verifier::new(algorithm));
                    }
                    if let Some(limit) = self.rate_limit {
                        let mut limiter = RateLimiter::unlimited();
                        limiter.set_direction_limit(Some(limit));
                        engine.set_rate_limiter(limiter);
                    }
                    self.copy = Some(engine);
                    self.phase = Phase::Copying;
                    return DoStatus::Moved;
                }
                DoStatus::Stall
            }
            Phase::Copying => {
                let Some(copy) = &mut self.copy else {
                    self.phase = Phase::Draining;
                    return DoStatus::Moved;
                };
                use xfer_core::scheduler::Task;
                let status = copy.step();
                if let Some(err) = copy.take_error() {
                    let code = err.job_exit_code();
                    self.fail(err.to_string());
                    self.exit_code = code;
                    return DoStatus::Moved;
                }
                if copy.is_done() {
                    self.phase = Phase::Draining;
                    return DoStatus::Moved;
                }
                match status {
                    Status::Moved => DoStatus::Moved,
                    _ => DoStatus::Stall,
                }
            }
            Phase::Draining => {
                if self.session.pending_replies() == 0 {
                    self.phase = Phase::Done;
                    return DoStatus::Moved;
                }
                DoStatus::Stall
            }
            Phase::Done => DoStatus::Stall,
        }
    }

    fn done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    fn exit_code(&self) -> JobExitCode {
        self.exit_code
    }

    fn show_run_status(&self, out: &mut dyn std::fmt::Write) {
        let offset = self.copy.as_ref().map_or(self.offset, transfer::CopyEngine::confirmed_offset);
        let _ = match &self.failure {
            Some(reason) => write!(out, "{} {}: {reason}", verb(self.direction), self.remote_path),
            None => write!(out, "{} {}: {offset} bytes", verb(self.direction), self.remote_path),
        };
    }

    fn accept_sig(&mut self, signum: i32) -> Status {
        if signum == SIGINT && !matches!(self.phase, Phase::Done) {
            self.failure.get_or_insert_with(|| "aborted".to_string());
            self.exit_code = JobExitCode::Aborted;
            self.phase = Phase::Done;
            return Status::WantDie;
        }
        Status::Stall
    }
}

/// The signal number a caller uses to ask a running job to abort, matching
/// the convention [`jobs::JobQueue::broadcast_sig`]'s own tests use.
const SIGINT: i32 = 2;

const fn verb(direction: Direction) -> &'static str {
    match direction {
        Direction::Get => "get",
        Direction::Put => "put",
    }
}

#[derive(Debug)]
enum ListPhase {
    LoggingIn,
    AwaitingPasvReply,
    Listing,
    Draining,
    Done,
}

/// A directory listing job: negotiates a data channel, races the dialect
/// parsers over the raw listing bytes, and exposes the result once done.
pub struct ListJob {
    control: ControlConnection,
    session: Session,
    login: Login,
    phase: ListPhase,
    user: String,
    password: String,
    path: Option<String>,
    data: Option<std::net::TcpStream>,
    pending: Vec<u8>,
    race: DialectRace,
    rendered: String,
    exit_code: JobExitCode,
    failure: Option<String>,
}

impl ListJob {
    /// Connects and prepares an `ls` job. See [`TransferJob::new`] for the
    /// synchronous-connect rationale.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`std::io::Error`] if the control connection
    /// can't be established.
    pub fn new(
        addr: SocketAddr,
        host: &str,
        user: &str,
        password: &str,
        path: Option<String>,
    ) -> std::io::Result<Self> {
        let control = ControlConnection::connect(addr)?;
        let mut session = Session::new(host);
        session.begin_connect();
        session.control_connected();

        Ok(Self {
            control,
            session,
            login: Login::new(),
            phase: ListPhase::LoggingIn,
            user: user.to_string(),
            password: password.to_string(),
            path,
            data: None,
            pending: Vec::new(),
            race: DialectRace::new(time::UtcOffset::UTC),
            rendered: String::new(),
            exit_code: JobExitCode::Success,
            failure: None,
        })
    }

    fn poll_control(&mut self) {
        match self.control.poll() {
            Ok(lines) => {
                for line in lines {
                    if let Err(e) = self.session.feed_control_line(&line) {
                        self.fail(format!("malformed reply: {e}"));
                        return;
                    }
                }
            }
            Err(e) => self.fail(format!("control connection: {e}")),
        }
        if let Some(msg) = self.session.last_error() {
            self.fail(msg.text().to_string());
        }
    }

    fn fail(&mut self, reason: String) {
        if self.failure.is_none() {
            self.failure = Some(reason);
            self.exit_code = JobExitCode::Fatal;
            self.phase = ListPhase::Done;
        }
    }

    fn drain_pending_lines(&mut self) {
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut raw = self.pending.drain(..=pos).collect::<Vec<u8>>();
            while raw.last().is_some_and(|&b| b == b'\n' || b == b'\r') {
                raw.pop();
            }
            self.race.feed_line(&String::from_utf8_lossy(&raw));
        }
    }

    /// The rendered listing, valid once [`Job::done`] is `true` and
    /// [`ListJob::failed`] is `false`.
    #[must_use]
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Whether the job ended in failure.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }
}

impl Job for ListJob {
    fn do_step(&mut self) -> DoStatus {
        if matches!(self.phase, ListPhase::Done) {
            return DoStatus::Stall;
        }

        self.poll_control();
        if matches!(self.phase, ListPhase::Done) {
            return DoStatus::Moved;
        }

        match self.phase {
            ListPhase::LoggingIn => {
                if self.login.step(&mut self.session, &self.user, &self.password) {
                    self.session.send_pasv();
                    self.phase = ListPhase::AwaitingPasvReply;
                    return DoStatus::Moved;
                }
                DoStatus::Stall
            }
            ListPhase::AwaitingPasvReply => {
                if self.session.pending_replies() == 0 && self.session.data_address().is_some() {
                    let addr = self.session.data_address().expect("checked above");
                    match check_data_address(&self.control, addr).and_then(|()| std::net::TcpStream::connect(addr)).and_then(|s| {
                        s.set_nonblocking(true)?;
                        Ok(s)
                    }) {
                        Ok(stream) => {
                            self.data = Some(stream);
                            self.session.send_list(self.path.as_deref());
                            self.phase = ListPhase::Listing;
                        }
                        Err(e) => self.fail(format!("data connection: {e}")),
                    }
                    return DoStatus::Moved;
                }
                DoStatus::Stall
            }
            ListPhase::Listing => {
                use std::io::Read;
                let Some(stream) = &mut self.data else {
                    self.phase = ListPhase::Draining;
                    return DoStatus::Moved;
                };
                let mut chunk = [0u8; 4096];
                match stream.read(&mut chunk) {
                    Ok(0) => {
                        self.drain_pending_lines();
                        let (files, dialect) = std::mem::replace(&mut self.race, DialectRace::new(time::UtcOffset::UTC)).finish();
                        tracing::debug!(dialect, count = files.len(), "listing parsed");
                        use std::fmt::Write as _;
                        for file in files.iter() {
                            let _ = writeln!(self.rendered, "{}", file.name());
                        }
                        self.phase = ListPhase::Draining;
                        DoStatus::Moved
                    }
                    Ok(n) => {
                        self.pending.extend_from_slice(&chunk[..n]);
                        self.drain_pending_lines();
                        DoStatus::Moved
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => DoStatus::Stall,
                    Err(e) => {
                        self.fail(format!("data connection: {e}"));
                        DoStatus::Moved
                    }
                }
            }
            ListPhase::Draining => {
                if self.session.pending_replies() == 0 {
                    self.phase = ListPhase::Done;
                    return DoStatus::Moved;
                }
                DoStatus::Stall
            }
            ListPhase::Done => DoStatus::Stall,
        }
    }

    fn done(&self) -> bool {
        matches!(self.phase, ListPhase::Done)
    }

    fn exit_code(&self) -> JobExitCode {
        self.exit_code
    }

    fn show_run_status(&self, out: &mut dyn std::fmt::Write) {
        match &self.failure {
            Some(reason) => {
                let _ = write!(out, "ls: {reason}");
            }
            None => {
                let _ = write!(out, "ls: {} entries", self.rendered.lines().count());
            }
        }
    }

    fn accept_sig(&mut self, signum: i32) -> Status {
        if signum == SIGINT && !matches!(self.phase, ListPhase::Done) {
            self.failure.get_or_insert_with(|| "aborted".to_string());
            self.exit_code = JobExitCode::Aborted;
            self.phase = ListPhase::Done;
            return Status::WantDie;
        }
        Status::Stall
    }
}
