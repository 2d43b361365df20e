//! The staging-buffer copy engine: pulls from a source, translates,
//! rate-limits, and drains to a destination one scheduler step at a time.

use io::{Direction, DirectedBuffer, Translator};
use xfer_core::scheduler::{Status, Task};

use crate::error::TransferError;
use crate::rate::RateLimiter;
use crate::verify::Verifier;

const DEFAULT_CHUNK: usize = 64 * 1024;
const MAX_CHUNK: usize = 1024 * 1024;

/// Outcome of a single non-blocking read attempt against a [`Source`].
pub enum ReadOutcome {
    /// `len` bytes are ready; they've been appended to the caller-supplied buffer.
    Data(Vec<u8>),
    /// The source has no more bytes to offer.
    Eof,
    /// The source would block; try again on the next scheduler pass.
    WouldBlock,
}

/// The producer half of a copy: local disk, a remote `RETR`/`STOR` data
/// channel, or a test double.
pub trait Source {
    /// Reads up to `max` bytes without blocking.
    fn read_chunk(&mut self, max: usize) -> Result<ReadOutcome, TransferError>;
}

/// The consumer half of a copy.
pub trait Sink {
    /// Writes as much of `data` as can be written without blocking, returning
    /// how many bytes were actually accepted (`0` means try again later).
    fn write_chunk(&mut self, data: &[u8]) -> Result<usize, TransferError>;
}

/// Drives bytes from a [`Source`] to a [`Sink`] through a translated staging
/// buffer, pacing with a [`RateLimiter`] and optionally hashing the stream
/// for a post-transfer verify.
///
/// [`CopyEngine::step`] never blocks: a source or sink that isn't ready
/// yields [`Status::Stall`], and a fatal error is recorded rather than
/// propagated, so the owning job can inspect it with
/// [`CopyEngine::take_error`] and decide whether to restart.
pub struct CopyEngine<T: Translator> {
    source: Box<dyn Source>,
    sink: Box<dyn Sink>,
    buffer: DirectedBuffer<T>,
    rate: RateLimiter,
    verifier: Option<Verifier>,
    chunk: usize,
    confirmed_offset: u64,
    source_eof: bool,
    last_error: Option<TransferError>,
    done: bool,
}

impl<T: Translator> CopyEngine<T> {
    /// Creates an engine that starts writing at `start_offset` (non-zero on
    /// a restart resuming a partial transfer).
    pub fn new(source: Box<dyn Source>, sink: Box<dyn Sink>, translator: T, start_offset: u64) -> Self {
        Self {
            source,
            sink,
            buffer: DirectedBuffer::new(Direction::Get, translator),
            rate: RateLimiter::unlimited(),
            verifier: None,
            chunk: DEFAULT_CHUNK,
            confirmed_offset: start_offset,
            source_eof: false,
            last_error: None,
            done: false,
        }
    }

    /// Attaches a rate limiter (direction and/or shared total pool already configured).
    pub fn set_rate_limiter(&mut self, rate: RateLimiter) {
        self.rate = rate;
    }

    /// Enables a post-transfer checksum over the bytes written to the destination.
    pub fn enable_verify(&mut self, verifier: Verifier) {
        self.verifier = Some(verifier);
    }

    /// The number of bytes confirmed written to the destination. Unlike the
    /// staging buffer's size, this excludes bytes pulled from the source but
    /// not yet accepted by the sink.
    #[must_use]
    pub const fn confirmed_offset(&self) -> u64 {
        self.confirmed_offset
    }

    /// Takes the last recorded error, if the engine halted on one.
    pub fn take_error(&mut self) -> Option<TransferError> {
        self.last_error.take()
    }

    /// Whether the copy has finished (source drained, all bytes delivered).
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Finalizes the verify digest, if one was enabled. Only meaningful once
    /// [`CopyEngine::is_done`] is `true`.
    pub fn finish_verify(&mut self) -> Option<String> {
        self.verifier.take().map(Verifier::finish)
    }

    fn pull(&mut self) -> Status {
        let room = self.rate.recommended_chunk(self.chunk);
        match self.source.read_chunk(room) {
            Ok(ReadOutcome::Data(bytes)) => {
                if bytes.len() >= self.chunk {
                    self.chunk = (self.chunk * 2).min(MAX_CHUNK);
                }
                self.rate.register(bytes.len());
                self.buffer.put_translated(&bytes);
                Status::Moved
            }
            Ok(ReadOutcome::Eof) => {
                self.source_eof = true;
                self.buffer.buffer().put_eof();
                Status::Moved
            }
            Ok(ReadOutcome::WouldBlock) => Status::Stall,
            Err(e) => {
                self.last_error = Some(e);
                Status::Stall
            }
        }
    }

    fn drain(&mut self) -> Status {
        let available = self.buffer.buffer().get();
        if available.is_empty() {
            return Status::Stall;
        }
        let take = self.rate.recommended_chunk(available.len()).max(1).min(available.len());
        let slice = available[..take].to_vec();
        match self.sink.write_chunk(&slice) {
            Ok(0) => Status::Stall,
            Ok(written) => {
                self.buffer.buffer().skip(written);
                self.rate.register(written);
                self.confirmed_offset += written as u64;
                if let Some(verifier) = &mut self.verifier {
                    verifier.update(&slice[..written]);
                }
                Status::Moved
            }
            Err(e) => {
                self.last_error = Some(e);
                Status::Stall
            }
        }
    }
}

impl<T: Translator> Task for CopyEngine<T> {
    fn step(&mut self) -> Status {
        if self.done || self.last_error.is_some() {
            return Status::Stall;
        }

        let drain_status = self.drain();
        if self.last_error.is_some() {
            return Status::Stall;
        }
        if matches!(drain_status, Status::Moved) {
            return Status::Moved;
        }

        if !self.source_eof {
            let pull_status = self.pull();
            if matches!(pull_status, Status::Moved) {
                return Status::Moved;
            }
        }

        if self.source_eof && self.buffer.buffer().size() == 0 {
            self.done = true;
            return Status::WantDie;
        }

        Status::Stall
    }

    fn log_context(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use io::translator::Passthrough;
    use std::collections::VecDeque;

    struct QueueSource {
        chunks: VecDeque<Vec<u8>>,
    }

    impl Source for QueueSource {
        fn read_chunk(&mut self, _max: usize) -> Result<ReadOutcome, TransferError> {
            match self.chunks.pop_front() {
                Some(bytes) => Ok(ReadOutcome::Data(bytes)),
                None => Ok(ReadOutcome::Eof),
            }
        }
    }

    struct VecSink {
        written: Vec<u8>,
    }

    impl Sink for VecSink {
        fn write_chunk(&mut self, data: &[u8]) -> Result<usize, TransferError> {
            self.written.extend_from_slice(data);
            Ok(data.len())
        }
    }

    struct StallingSink {
        allow: usize,
        written: Vec<u8>,
    }

    impl Sink for StallingSink {
        fn write_chunk(&mut self, data: &[u8]) -> Result<usize, TransferError> {
            if self.allow == 0 {
                return Ok(0);
            }
            let take = data.len().min(self.allow);
            self.written.extend_from_slice(&data[..take]);
            self.allow -= take;
            Ok(take)
        }
    }

    fn run_to_completion<T: Translator>(engine: &mut CopyEngine<T>) {
        loop {
            match engine.step() {
                Status::WantDie => break,
                Status::Stall => {
                    if engine.take_error().is_some() {
                        panic!("engine halted on an unexpected error");
                    }
                    if engine.is_done() {
                        break;
                    }
                }
                Status::Moved => {}
            }
        }
    }

    #[test]
    fn a_full_copy_delivers_every_byte_in_order() {
        let source = Box::new(QueueSource {
            chunks: VecDeque::from([b"hello ".to_vec(), b"world".to_vec()]),
        });
        let sink = Box::new(VecSink { written: Vec::new() });
        let mut engine = CopyEngine::new(source, sink, Passthrough, 0);
        run_to_completion(&mut engine);
        assert!(engine.is_done());
        assert_eq!(engine.confirmed_offset(), 11);
    }

    #[test]
    fn a_sink_that_accepts_only_part_of_a_write_eventually_drains() {
        let source = Box::new(QueueSource {
            chunks: VecDeque::from([b"0123456789".to_vec()]),
        });
        let sink = Box::new(StallingSink { allow: 3, written: Vec::new() });
        let mut engine = CopyEngine::new(source, sink, Passthrough, 0);
        // First pass: the sink only accepts 3 bytes before refusing further writes.
        for _ in 0..3 {
            let status = engine.step();
            assert!(!matches!(status, Status::WantDie));
        }
        assert_eq!(engine.confirmed_offset(), 3);
    }

    #[test]
    fn a_restart_offset_is_preserved_as_the_starting_confirmed_offset() {
        let source = Box::new(QueueSource { chunks: VecDeque::new() });
        let sink = Box::new(VecSink { written: Vec::new() });
        let engine = CopyEngine::new(source, sink, Passthrough, 4096);
        assert_eq!(engine.confirmed_offset(), 4096);
    }
}
