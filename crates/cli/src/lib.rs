#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the non-interactive driver: it parses one subcommand
//! ([`args::Cli`]), resolves the remote host, builds a single
//! [`jobs::JobQueue`] with one job in it, and drives that queue to
//! completion, writing a result line to the caller-supplied output stream.
//!
//! Building an interactive shell — a command parser, aliases, readline,
//! prompt formatting, history — is explicitly not this crate's job; each
//! invocation of [`run`] does exactly one thing and returns.
//!
//! # Modules
//!
//! - [`args`]: the `clap` argument shape.
//! - [`logging`]: `tracing-subscriber` wiring gated on `-v` count.
//! - [`settings`]: loads a flat settings file into a
//!   [`xfer_core::config::StaticResourceStore`], layered over
//!   [`xfer_core::config::EnvResourceStore`].
//! - [`transport`]: local-file and non-blocking-TCP [`transfer::Source`]/[`transfer::Sink`]
//!   endpoints, plus the control-connection line reader.
//! - [`handshake`]: the shared `USER`/`PASS`/`TYPE I` login sequence.
//! - [`job`]: the [`jobs::Job`] implementations that drive a
//!   [`protocol::session::Session`] and a [`transfer::CopyEngine`] or
//!   listing race to completion.

pub mod args;
pub mod handshake;
pub mod job;
pub mod logging;
pub mod settings;
pub mod transport;

use std::io::Write;
use std::net::{SocketAddr, ToSocketAddrs};

use xfer_core::config::{EnvResourceStore, ResourceStore};
use xfer_core::exit_code::JobExitCode;

use args::{Cli, Command};
use job::{Direction, ListJob, TransferJob};
use settings::Layered;

const DEFAULT_PORT: u16 = 21;
const DEFAULT_USER: &str = "anonymous";
const DEFAULT_PASSWORD: &str = "anonymous@";

/// Runs one [`Cli`] invocation to completion, writing a result summary to
/// `out` (success) or `err` (failure) and returning the job's exit code.
///
/// Host resolution is a single synchronous [`ToSocketAddrs`] lookup rather
/// than a cooperative step through [`resolver::Resolver`]: a one-shot CLI
/// invocation has nothing else to make progress on while it waits, so the
/// non-blocking resolver this workspace ships for long-running sessions
/// would add a scheduler and a loop this program has no other use for.
pub fn run(cli: Cli, out: &mut dyn Write, err: &mut dyn Write) -> JobExitCode {
    logging::init(cli.verbose);

    let store = match build_resource_store(cli.config.as_deref()) {
        Ok(store) => store,
        Err(e) => {
            let _ = writeln!(err, "xfer: {e}");
            return JobExitCode::Fatal;
        }
    };

    let Some(host) = cli.host.clone() else {
        let _ = writeln!(err, "xfer: --host is required");
        return JobExitCode::Fatal;
    };
    let port = cli.port.unwrap_or(DEFAULT_PORT);

    let addr = match resolve(&host, port) {
        Ok(addr) => addr,
        Err(e) => {
            let _ = writeln!(err, "xfer: resolving {host}: {e}");
            return JobExitCode::Fatal;
        }
    };

    let user = cli.user.clone().unwrap_or_else(|| DEFAULT_USER.to_string());
    let password = cli.password.clone().unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
    let bwlimit_raw = cli.bwlimit.clone().or_else(|| store.query("net:limit-rate", Some(host.as_str())).or_else(|| store.query("net:limit-rate", None)));
    let rate_limit = match bwlimit_raw.map(|raw| xfer_core::config::parse_rate(&raw)) {
        Some(Ok(bytes)) => std::num::NonZeroU64::new(bytes),
        Some(Err(e)) => {
            let _ = writeln!(err, "xfer: --bwlimit: {e}");
            return JobExitCode::Fatal;
        }
        None => None,
    };

    let mut queue = jobs::JobQueue::new(1);

    let spawned: std::io::Result<JobResult> = match cli.command {
        Command::Ls { path } => ListJob::new(addr, &host, &user, &password, path).map(JobResult::List),
        Command::Get { remote, local, restart, verify } => TransferJob::new(
            addr,
            &host,
            &user,
            &password,
            Direction::Get,
            remote,
            local,
            restart,
            verify.map(std::convert::Into::into),
            rate_limit,
        )
        .map(JobResult::Transfer),
        Command::Put { local, remote, restart } => TransferJob::new(
            addr,
            &host,
            &user,
            &password,
            Direction::Put,
            remote,
            local,
            restart,
            None,
            rate_limit,
        )
        .map(JobResult::Transfer),
    };

    match spawned {
        Ok(JobResult::List(job)) => drive_list(&mut queue, job, out, err),
        Ok(JobResult::Transfer(job)) => drive_transfer(&mut queue, job, out, err),
        Err(e) => {
            let _ = writeln!(err, "xfer: connecting to {host}:{port}: {e}");
            JobExitCode::Fatal
        }
    }
}

enum JobResult {
    List(ListJob),
    Transfer(TransferJob),
}

/// How long a single invocation waits for a network op to complete before
/// giving up and aborting the job.
const JOB_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);
/// How long to sleep between [`jobs::JobQueue::run_to_fixed_point`] passes
/// once a pass makes no further progress, giving the non-blocking sockets a
/// moment to become readable before polling again.
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(20);
/// The signal number used to abort a job that ran past [`JOB_TIMEOUT`].
const SIGINT: i32 = 2;

fn drive_list(queue: &mut jobs::JobQueue, job: ListJob, out: &mut dyn Write, err: &mut dyn Write) -> JobExitCode {
    let id = queue.spawn(Box::new(job), None, "ls");
    let code = drive_to_completion(queue, id);
    let mut summary = String::new();
    queue.show_run_status(id, &mut summary);
    if code == JobExitCode::Success {
        let _ = writeln!(out, "{summary}");
    } else {
        let _ = writeln!(err, "{summary}");
    }
    code
}

fn drive_transfer(queue: &mut jobs::JobQueue, job: TransferJob, out: &mut dyn Write, err: &mut dyn Write) -> JobExitCode {
    let id = queue.spawn(Box::new(job), None, "transfer");
    let code = drive_to_completion(queue, id);
    let mut summary = String::new();
    queue.show_run_status(id, &mut summary);
    if code == JobExitCode::Success {
        let _ = writeln!(out, "{summary}");
    } else {
        let _ = writeln!(err, "{summary}");
    }
    code
}

/// Drives `queue` through repeated [`jobs::JobQueue::run_to_fixed_point`]
/// passes, sleeping briefly between them, until `id` finishes or
/// [`JOB_TIMEOUT`] elapses. Mirrors `xfer_core::scheduler::Scheduler::run_for`'s
/// own "outer poll loop that must also service a timeout" shape: a single
/// pass only ever drains what's already readable on a non-blocking socket,
/// so the caller is responsible for giving the peer time to answer between
/// passes.
fn drive_to_completion(queue: &mut jobs::JobQueue, id: jobs::JobId) -> JobExitCode {
    let deadline = std::time::Instant::now() + JOB_TIMEOUT;
    loop {
        queue.run_to_fixed_point();
        if queue.is_finished(id) {
            break;
        }
        if std::time::Instant::now() >= deadline {
            queue.broadcast_sig(SIGINT);
            queue.run_to_fixed_point();
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    queue.exit_code(id)
}

fn build_resource_store(
    config_path: Option<&std::path::Path>,
) -> Result<Layered<xfer_core::config::StaticResourceStore, EnvResourceStore>, settings::SettingsError> {
    let file_store = match config_path {
        Some(path) => settings::load(path)?,
        None => xfer_core::config::StaticResourceStore::new(),
    };
    Ok(Layered::new(file_store, EnvResourceStore::new("XFER_")))
}

fn resolve(host: &str, port: u16) -> std::io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"))
}
