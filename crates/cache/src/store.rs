//! The listing cache proper: raw listing bytes keyed by
//! [`CacheKey`](crate::key::CacheKey), evicted by a total-size bound (head
//! of insertion order first) and by a per-entry expiry timer, plus a
//! small directory/file shape side table a `Lister` consults before
//! probing the remote end at all.
//!
//! Grounded on the generic `Cache`/`CacheEntry` base (size-bounded,
//! FIFO-trimmed, per-entry `Stopped()` timer) and on the `LsCache::Find`/
//! `Add`/`IsDirectory`/`SetDirectory` call shape its callers use.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::key::CacheKey;

struct Entry {
    payload: Vec<u8>,
    inserted: Instant,
    expire: Duration,
}

impl Entry {
    fn expired(&self) -> bool {
        self.inserted.elapsed() > self.expire
    }
}

/// Process-wide cache of raw listing payloads plus directory/file shape
/// knowledge, both evicted on a size bound and an expiry timer.
pub struct ListingCache {
    entries: HashMap<CacheKey, Entry>,
    insertion_order: Vec<CacheKey>,
    total_size: usize,
    size_limit: usize,
    default_expire: Duration,
    shapes: HashMap<(String, String), bool>,
}

impl ListingCache {
    #[must_use]
    pub fn new(size_limit: usize, default_expire: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: Vec::new(),
            total_size: 0,
            size_limit,
            default_expire,
            shapes: HashMap::new(),
        }
    }

    /// Returns the cached payload for `key`, or `None` on a miss or an
    /// expired entry (an expired entry is left in place; it is reclaimed
    /// lazily by the next [`ListingCache::trim`]).
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<&[u8]> {
        let entry = self.entries.get(key)?;
        if entry.expired() {
            return None;
        }
        Some(&entry.payload)
    }

    /// Stores `payload` under `key` with the cache's default expiry, then
    /// trims to the size bound.
    pub fn put(&mut self, key: CacheKey, payload: Vec<u8>) {
        let expire = self.default_expire;
        self.put_with_expiry(key, payload, expire);
    }

    pub fn put_with_expiry(&mut self, key: CacheKey, payload: Vec<u8>, expire: Duration) {
        if let Some(old) = self.entries.remove(&key) {
            self.total_size -= old.payload.len();
            self.insertion_order.retain(|k| k != &key);
        }
        self.total_size += payload.len();
        self.entries.insert(key.clone(), Entry { payload, inserted: Instant::now(), expire });
        self.insertion_order.push(key);
        self.trim();
    }

    /// Drops expired entries, then drops from the head of insertion order
    /// until the total size is within bound.
    pub fn trim(&mut self) {
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, e)| e.expired())
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            if let Some(e) = self.entries.remove(&key) {
                self.total_size -= e.payload.len();
            }
            self.insertion_order.retain(|k| k != &key);
        }

        while self.total_size > self.size_limit && !self.insertion_order.is_empty() {
            let oldest = self.insertion_order.remove(0);
            if let Some(e) = self.entries.remove(&oldest) {
                self.total_size -= e.payload.len();
            }
        }
    }

    /// Drops every cached listing and shape entry.
    pub fn flush(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
        self.total_size = 0;
        self.shapes.clear();
    }

    #[must_use]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// What this cache knows about whether `path` (under `session`) is a
    /// directory or a plain file, if anything.
    #[must_use]
    pub fn is_directory(&self, session: &str, path: &str) -> Option<bool> {
        self.shapes.get(&(session.to_string(), path.to_string())).copied()
    }

    /// Records that `path` (under `session`) is known to be a directory
    /// (`true`) or a file (`false`).
    pub fn set_directory(&mut self, session: &str, path: &str, is_directory: bool) {
        self.shapes.insert((session.to_string(), path.to_string()), is_directory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Mode;

    fn key(path: &str) -> CacheKey {
        CacheKey::new("ftp://user@host", path, Mode::Long)
    }

    #[test]
    fn a_fresh_put_is_found_by_get() {
        let mut cache = ListingCache::new(1024, Duration::from_secs(60));
        cache.put(key("/pub"), b"listing bytes".to_vec());
        assert_eq!(cache.get(&key("/pub")), Some(&b"listing bytes"[..]));
    }

    #[test]
    fn entries_beyond_the_size_bound_are_evicted_oldest_first() {
        let mut cache = ListingCache::new(10, Duration::from_secs(60));
        cache.put(key("/a"), vec![0u8; 6]);
        cache.put(key("/b"), vec![0u8; 6]);
        assert!(cache.get(&key("/a")).is_none());
        assert!(cache.get(&key("/b")).is_some());
    }

    #[test]
    fn an_expired_entry_is_not_returned() {
        let mut cache = ListingCache::new(1024, Duration::from_millis(10));
        cache.put(key("/pub"), b"x".to_vec());
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get(&key("/pub")).is_none());
    }

    #[test]
    fn directory_shape_is_recorded_and_queried_independently_of_payload_cache() {
        let mut cache = ListingCache::new(1024, Duration::from_secs(60));
        cache.set_directory("ftp://user@host", "/pub", true);
        cache.set_directory("ftp://user@host", "/pub/readme", false);
        assert_eq!(cache.is_directory("ftp://user@host", "/pub"), Some(true));
        assert_eq!(cache.is_directory("ftp://user@host", "/pub/readme"), Some(false));
        assert_eq!(cache.is_directory("ftp://user@host", "/unknown"), None);
    }

    #[test]
    fn flush_clears_both_payloads_and_shapes() {
        let mut cache = ListingCache::new(1024, Duration::from_secs(60));
        cache.put(key("/pub"), b"x".to_vec());
        cache.set_directory("ftp://user@host", "/pub", true);
        cache.flush();
        assert!(cache.is_empty());
        assert_eq!(cache.is_directory("ftp://user@host", "/pub"), None);
    }
}
