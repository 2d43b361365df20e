//! Process-wide resolver cache keyed on the five lookup inputs.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// The five inputs that together identify one resolver lookup.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheKey {
    pub hostname: String,
    pub port: Option<String>,
    pub default_port: Option<String>,
    pub service: Option<String>,
    pub protocol: Option<String>,
}

struct Entry {
    addresses: Vec<SocketAddr>,
    inserted: Instant,
    expire: Duration,
}

/// A bounded, process-wide cache of resolved addresses.
///
/// Callers must copy the returned address list before yielding control
/// back to the scheduler: nothing in this cache is pinned against
/// eviction, and a later [`ResolverCache::insert`] from an unrelated
/// lookup can evict any entry once the size bound is exceeded.
pub struct ResolverCache {
    entries: HashMap<CacheKey, Entry>,
    insertion_order: Vec<CacheKey>,
    max_entries: usize,
    default_expire: Duration,
}

impl ResolverCache {
    /// Creates a cache holding at most `max_entries`, with entries expiring
    /// after `default_expire` unless overridden per insert.
    #[must_use]
    pub fn new(max_entries: usize, default_expire: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: Vec::new(),
            max_entries,
            default_expire,
        }
    }

    /// Looks up `key`, returning the cached addresses if present and not expired.
    #[must_use]
    pub fn lookup(&self, key: &CacheKey) -> Option<Vec<SocketAddr>> {
        let entry = self.entries.get(key)?;
        if entry.inserted.elapsed() > entry.expire {
            return None;
        }
        Some(entry.addresses.clone())
    }

    /// Inserts or replaces the cached addresses for `key`, using this
    /// cache's default expiry.
    pub fn insert(&mut self, key: CacheKey, addresses: Vec<SocketAddr>) {
        self.insert_with_expiry(key, addresses, self.default_expire);
    }

    /// Inserts or replaces the cached addresses for `key` with an explicit
    /// expiry, evicting the oldest entry by insertion order if the cache is
    /// now over its size bound.
    pub fn insert_with_expiry(&mut self, key: CacheKey, addresses: Vec<SocketAddr>, expire: Duration) {
        if !self.entries.contains_key(&key) {
            self.insertion_order.push(key.clone());
        }
        self.entries.insert(
            key,
            Entry {
                addresses,
                inserted: Instant::now(),
                expire,
            },
        );
        while self.entries.len() > self.max_entries {
            let oldest = self.insertion_order.remove(0);
            self.entries.remove(&oldest);
        }
    }

    /// Number of entries currently held, including any that have expired
    /// but not yet been evicted or overwritten.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
