//! Command-line argument shape.
//!
//! Deliberately thin: no interactive shell, no readline, no aliases (those
//! are out of scope). Each invocation runs exactly one subcommand against
//! one remote host and exits.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A single non-interactive transfer against a remote file-transfer service.
#[derive(Debug, Parser)]
#[command(name = "xfer", version, about = "Transfer files against a remote FTP-style service")]
pub struct Cli {
    /// Remote host to connect to.
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Remote port. Defaults to 21 if unset.
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Remote login name. Defaults to "anonymous".
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Remote password. Prefer `XFER_PASSWORD` over this for non-toy use.
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Per-direction and total transfer rate cap, e.g. "1.5m" or "unlimited".
    #[arg(long, global = true)]
    pub bwlimit: Option<String>,

    /// Path to a `key = value` settings file populating the resource store.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// The operation to run.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List a remote directory.
    Ls {
        /// Remote path to list; defaults to the current working directory.
        path: Option<String>,
    },
    /// Download a remote file to a local path.
    Get {
        /// Remote source path.
        remote: String,
        /// Local destination path.
        local: PathBuf,
        /// Resume a previously interrupted transfer at its last confirmed offset.
        #[arg(long)]
        restart: bool,
        /// Verify the downloaded bytes against a hex digest with this algorithm.
        #[arg(long, value_enum)]
        verify: Option<VerifyAlgorithmArg>,
    },
    /// Upload a local file to a remote path.
    Put {
        /// Local source path.
        local: PathBuf,
        /// Remote destination path.
        remote: String,
        /// Resume a previously interrupted transfer at its last confirmed offset.
        #[arg(long)]
        restart: bool,
    },
}

/// `clap`-friendly mirror of [`checksums::strong::VerifyAlgorithm`].
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum VerifyAlgorithmArg {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    Xxh64,
}

impl From<VerifyAlgorithmArg> for checksums::strong::VerifyAlgorithm {
    fn from(value: VerifyAlgorithmArg) -> Self {
        match value {
            VerifyAlgorithmArg::Md5 => Self::Md5,
            VerifyAlgorithmArg::Sha1 => Self::Sha1,
            VerifyAlgorithmArg::Sha256 => Self::Sha256,
            VerifyAlgorithmArg::Sha512 => Self::Sha512,
            VerifyAlgorithmArg::Xxh64 => Self::Xxh64,
        }
    }
}
