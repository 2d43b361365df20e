//! Concrete [`transfer::Source`]/[`transfer::Sink`] endpoints: a local file
//! and a non-blocking TCP data connection. Local I/O is one side of every
//! `get`/`put`; the TCP side is the other.
//!
//! Sockets are put in non-blocking mode so [`transfer::CopyEngine::step`]'s
//! never-blocks contract holds even for the real network endpoint, not just
//! its test doubles.

use std::fs::File;
use std::io::{self, Read, Write};
use std::net::TcpStream;

use transfer::{ReadOutcome, Sink, Source, TransferError};

/// A local file read as a transfer source.
pub struct FileSource {
    file: File,
    buf: Vec<u8>,
}

impl FileSource {
    /// Opens `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] if the file can't be opened.
    pub fn open(path: &std::path::Path) -> io::Result<Self> {
        Ok(Self { file: File::open(path)?, buf: Vec::new() })
    }
}

impl Source for FileSource {
    fn read_chunk(&mut self, max: usize) -> Result<ReadOutcome, TransferError> {
        self.buf.resize(max, 0);
        match self.file.read(&mut self.buf) {
            Ok(0) => Ok(ReadOutcome::Eof),
            Ok(n) => Ok(ReadOutcome::Data(self.buf[..n].to_vec())),
            Err(e) => Err(TransferError::Source(e)),
        }
    }
}

/// A local file written as a transfer sink.
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Creates (or truncates) `path` for writing, or opens it for append
    /// when resuming a restart at a non-zero offset.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] if the file can't be opened.
    pub fn create(path: &std::path::Path, resume_at: Option<u64>) -> io::Result<Self> {
        let file = if resume_at.is_some() {
            std::fs::OpenOptions::new().write(true).create(true).append(true).open(path)?
        } else {
            File::create(path)?
        };
        Ok(Self { file })
    }
}

impl Sink for FileSink {
    fn write_chunk(&mut self, data: &[u8]) -> Result<usize, TransferError> {
        self.file.write_all(data).map_err(TransferError::Sink)?;
        Ok(data.len())
    }
}

/// A non-blocking TCP data connection read as a transfer source (`RETR`).
pub struct TcpSource {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl TcpSource {
    /// Wraps `stream`, switching it to non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] if non-blocking mode can't be set.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self { stream, buf: Vec::new() })
    }
}

impl Source for TcpSource {
    fn read_chunk(&mut self, max: usize) -> Result<ReadOutcome, TransferError> {
        self.buf.resize(max, 0);
        match self.stream.read(&mut self.buf) {
            Ok(0) => Ok(ReadOutcome::Eof),
            Ok(n) => Ok(ReadOutcome::Data(self.buf[..n].to_vec())),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(ReadOutcome::WouldBlock),
            Err(e) => Err(TransferError::Source(e)),
        }
    }
}

/// A non-blocking TCP data connection written as a transfer sink (`STOR`).
pub struct TcpSink {
    stream: TcpStream,
}

impl TcpSink {
    /// Wraps `stream`, switching it to non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] if non-blocking mode can't be set.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self { stream })
    }
}

impl Sink for TcpSink {
    fn write_chunk(&mut self, data: &[u8]) -> Result<usize, TransferError> {
        match self.stream.write(data) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(TransferError::Sink(e)),
        }
    }
}

/// Buffers partial reads off a non-blocking control-connection socket and
/// hands back complete CRLF-terminated lines, the transport [`protocol::session::Session`]
/// expects its caller to own.
pub struct ControlConnection {
    stream: TcpStream,
    pending: Vec<u8>,
}

impl ControlConnection {
    /// Connects to `addr` and switches to non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] on connect or mode-switch failure.
    pub fn connect(addr: std::net::SocketAddr) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nonblocking(true)?;
        Ok(Self { stream, pending: Vec::new() })
    }

    /// Sends a command line, appending the CRLF the wire format requires.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] if the write fails for a reason
    /// other than the socket not being ready yet.
    pub fn send_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = Vec::with_capacity(line.len() + 2);
        out.extend_from_slice(line.as_bytes());
        out.extend_from_slice(b"\r\n");
        match self.stream.write_all(&out) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// The control connection's remote address, used to guard a negotiated
    /// data-channel address against an `FTP bounce` style redirection.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] if the socket has no peer.
    pub fn peer_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.stream.peer_addr()
    }

    /// Polls the socket once and returns every complete line newly available.
    /// An empty vector means nothing is ready yet.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] for a non-`WouldBlock` read failure.
    pub fn poll(&mut self) -> io::Result<Vec<String>> {
        let mut chunk = [0u8; 4096];
        match self.stream.read(&mut chunk) {
            Ok(0) => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "control connection closed")),
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                Ok(self.drain_lines())
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn drain_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut raw = self.pending.drain(..=pos).collect::<Vec<u8>>();
            while raw.last().is_some_and(|&b| b == b'\n' || b == b'\r') {
                raw.pop();
            }
            lines.push(String::from_utf8_lossy(&raw).into_owned());
        }
        lines
    }
}
