//! The core buffered byte pipe: append on one end, consume from the other,
//! with an optional "keep what you've consumed" save/rollback mode.

use std::fmt::Write as _;

use crate::speedometer::Speedometer;

/// A growable byte buffer with a read cursor, optional save/rollback
/// region, and EOF/broken/error flags.
///
/// Bytes are appended with [`Buffer::put`] and consumed from the front with
/// [`Buffer::skip`] after being inspected via [`Buffer::get`]. When
/// [`Buffer::save`] is enabled, skipped bytes are not actually discarded
/// until they fall more than `save_max` bytes behind the read cursor, so
/// [`Buffer::save_rollback`] can rewind the cursor to an earlier position —
/// the listing cache's replay mechanism depends on this.
#[derive(Default)]
pub struct Buffer {
    data: Vec<u8>,
    /// Index of the next unread byte.
    start: usize,
    /// Index below which bytes have been permanently discarded.
    floor: usize,
    /// Absolute stream position of `data[floor]`.
    floor_pos: u64,
    eof: bool,
    broken: bool,
    error: Option<(String, bool)>,
    saving: bool,
    save_max: usize,
    rate: Option<Speedometer>,
}

impl Buffer {
    /// Creates an empty buffer at stream position `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `buf` to the end of the buffer.
    pub fn put(&mut self, buf: &[u8]) {
        self.data.extend_from_slice(buf);
        if let Some(rate) = &mut self.rate {
            rate.add(buf.len());
        }
    }

    /// Appends formatted text, matching the C `Format(fmt, ...)` helper's
    /// role of building a command line in place.
    pub fn format(&mut self, args: std::fmt::Arguments<'_>) {
        let mut text = String::new();
        let _ = text.write_fmt(args);
        self.put(text.as_bytes());
    }

    /// Prepends `buf` before the unread region, used to push back bytes
    /// read too eagerly (a translator that over-reads a line boundary).
    pub fn prepend(&mut self, buf: &[u8]) {
        self.data.splice(self.start..self.start, buf.iter().copied());
    }

    /// The unread byte region.
    #[must_use]
    pub fn get(&self) -> &[u8] {
        &self.data[self.start..]
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len() - self.start
    }

    /// Whether no more bytes will ever be read (the far end signaled EOF
    /// and all buffered bytes have been consumed).
    #[must_use]
    pub fn eof(&self) -> bool {
        self.eof && self.size() == 0
    }

    /// Marks that the far end will produce no more bytes.
    pub fn put_eof(&mut self) {
        self.eof = true;
    }

    /// Whether no more bytes can be written (the far end is gone).
    #[must_use]
    pub const fn broken(&self) -> bool {
        self.broken
    }

    /// Marks the buffer as unable to accept further writes.
    pub fn set_broken(&mut self) {
        self.broken = true;
    }

    /// Whether an error has been recorded.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether a recorded error is fatal (should abort retries).
    #[must_use]
    pub fn error_fatal(&self) -> bool {
        self.error.as_ref().is_some_and(|(_, fatal)| *fatal)
    }

    /// The recorded error text, if any.
    #[must_use]
    pub fn error_text(&self) -> Option<&str> {
        self.error.as_ref().map(|(text, _)| text.as_str())
    }

    /// Records an error, optionally fatal.
    pub fn set_error(&mut self, text: impl Into<String>, fatal: bool) {
        self.error = Some((text.into(), fatal));
    }

    /// Clears a previously recorded error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Consumes `len` bytes from the front of the unread region.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`Buffer::size`].
    pub fn skip(&mut self, len: usize) {
        assert!(len <= self.size(), "skip past the end of the buffer");
        self.start += len;
        if self.saving {
            self.save_max_check();
        } else {
            self.floor = self.start;
            self.floor_pos += len as u64;
            self.compact();
        }
    }

    /// Pushes the read cursor back by `len` bytes, only valid if those
    /// bytes were never actually discarded (no intervening compaction).
    ///
    /// # Panics
    ///
    /// Panics if `len` would move the cursor before `floor`.
    pub fn unskip(&mut self, len: usize) {
        assert!(self.start >= self.floor + len, "unskip past the saved floor");
        self.start -= len;
    }

    /// Enables save mode: skipped bytes are kept (up to `max` bytes behind
    /// the cursor) so [`Buffer::save_rollback`] can rewind to them.
    pub fn save(&mut self, max: usize) {
        self.saving = true;
        self.save_max = max;
    }

    /// Whether save mode is enabled.
    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    fn save_max_check(&mut self) {
        let saved = self.start - self.floor;
        if saved > self.save_max {
            let drop = saved - self.save_max;
            self.floor += drop;
            self.floor_pos += drop as u64;
            self.compact();
        }
    }

    fn compact(&mut self) {
        // Only reclaim memory once a meaningful amount has fallen behind
        // `floor`; compacting on every single byte would shift the vector
        // constantly for no benefit.
        if self.floor > 64 * 1024 {
            self.data.drain(..self.floor);
            self.start -= self.floor;
            self.floor = 0;
        }
    }

    /// The saved (already-skipped-but-retained) byte region, oldest first.
    #[must_use]
    pub fn get_saved(&self) -> &[u8] {
        &self.data[self.floor..self.start]
    }

    /// Rewinds the read cursor to absolute stream position `p`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `p` falls outside the currently retained saved
    /// region (`[floor_pos, floor_pos + (start - floor)]`).
    pub fn save_rollback(&mut self, p: u64) -> Result<(), RollbackError> {
        let current_pos = self.floor_pos + (self.start - self.floor) as u64;
        if p < self.floor_pos || p > current_pos {
            return Err(RollbackError { requested: p, floor_pos: self.floor_pos, current_pos });
        }
        self.start = self.floor + (p - self.floor_pos) as usize;
        Ok(())
    }

    /// The absolute stream position of the next unread byte.
    #[must_use]
    pub fn pos(&self) -> u64 {
        self.floor_pos + (self.start - self.floor) as u64
    }

    /// Resets the buffer to empty, clearing all flags and the error state.
    pub fn empty(&mut self) {
        *self = Self {
            rate: self.rate.take(),
            ..Self::default()
        };
    }

    /// Attaches a speedometer that every [`Buffer::put`] reports bytes to.
    pub fn set_speedometer(&mut self, rate: Speedometer) {
        self.rate = Some(rate);
    }

    // -- big-endian pack/unpack helpers -------------------------------

    /// Reads an unsigned 8-bit integer at `offset` into the unread region
    /// without consuming it.
    #[must_use]
    pub fn unpack_u8(&self, offset: usize) -> u8 {
        self.get()[offset]
    }

    /// Reads a big-endian unsigned 16-bit integer at `offset`.
    #[must_use]
    pub fn unpack_u16_be(&self, offset: usize) -> u16 {
        let s = &self.get()[offset..offset + 2];
        u16::from_be_bytes([s[0], s[1]])
    }

    /// Reads a big-endian unsigned 32-bit integer at `offset`.
    #[must_use]
    pub fn unpack_u32_be(&self, offset: usize) -> u32 {
        let s = &self.get()[offset..offset + 4];
        u32::from_be_bytes([s[0], s[1], s[2], s[3]])
    }

    /// Reads a big-endian unsigned 64-bit integer at `offset`.
    #[must_use]
    pub fn unpack_u64_be(&self, offset: usize) -> u64 {
        let s = &self.get()[offset..offset + 8];
        u64::from_be_bytes([s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]])
    }

    /// Appends an unsigned 8-bit integer.
    pub fn pack_u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    /// Appends a big-endian unsigned 16-bit integer.
    pub fn pack_u16_be(&mut self, v: u16) {
        self.put(&v.to_be_bytes());
    }

    /// Appends a big-endian unsigned 32-bit integer.
    pub fn pack_u32_be(&mut self, v: u32) {
        self.put(&v.to_be_bytes());
    }

    /// Appends a big-endian unsigned 64-bit integer.
    pub fn pack_u64_be(&mut self, v: u64) {
        self.put(&v.to_be_bytes());
    }
}

/// Error returned when a [`Buffer::save_rollback`] target position falls
/// outside the retained saved region.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("cannot roll back to position {requested}: retained window is [{floor_pos}, {current_pos}]")]
pub struct RollbackError {
    requested: u64,
    floor_pos: u64,
    current_pos: u64,
}
