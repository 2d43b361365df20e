//! The resolver task: ties cache lookup, family-preference ordering, `SRV`
//! ordering and a pluggable name-lookup backend together as a scheduler
//! [`Task`].

use std::net::SocketAddr;
use std::time::Duration;

use xfer_core::message::{Message, Role};
use xfer_core::scheduler::{Status, Task};
use xfer_core::timer::Timer;

use crate::cache::{CacheKey, ResolverCache};
use crate::order::{self, AddressFamily};
use crate::srv::{self, SrvRecord};

/// A synchronous name-lookup backend. Production code backs this with a
/// forked helper speaking [`crate::child_protocol`]; tests back it with a
/// canned table, since nothing here opens a real socket.
pub trait NameLookup {
    /// Resolves `hostname` to a set of addresses, or fails with the text
    /// `getaddrinfo` would report.
    fn lookup_host(&mut self, hostname: &str) -> Result<Vec<SocketAddr>, String>;

    /// Resolves `service` (e.g. `"ftp"`) to a port number for `protocol`
    /// (e.g. `"tcp"`), or fails with the text `getservbyname` would report.
    fn lookup_service(&mut self, service: &str, protocol: &str) -> Result<u16, String>;

    /// Resolves `SRV` records for `_service._proto.name`, or returns an
    /// empty list if none exist (not an error: `SRV` is an optional layer
    /// ahead of the plain `A`/`AAAA` lookup).
    fn lookup_srv(&mut self, service: &str, protocol: &str, name: &str) -> Vec<SrvRecord>;
}

/// What the resolver task is currently doing.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Phase {
    /// Not yet started.
    Idle,
    /// Waiting on `retry_timer` after a transient failure (`TRY_AGAIN`).
    Backoff,
    /// Finished, successfully or not.
    Done,
}

/// A single DNS/service resolution, modeled as a scheduler task so it
/// shares the cooperative loop with every other connection-facing
/// component instead of blocking a thread.
pub struct Resolver<L: NameLookup> {
    hostname: String,
    portname: Option<String>,
    default_port: Option<u16>,
    service: Option<String>,
    protocol: String,
    order: Vec<AddressFamily>,
    lookup: L,
    retry_timer: Timer,
    max_retries: u32,
    attempts: u32,
    phase: Phase,
    result: Option<Vec<SocketAddr>>,
    error: Option<Message>,
}

impl<L: NameLookup> Resolver<L> {
    /// Creates a resolver for `hostname`, using `lookup` as the
    /// name-resolution backend and the default (IPv4-before-IPv6) family
    /// preference.
    pub fn new(hostname: impl Into<String>, lookup: L) -> Self {
        Self {
            hostname: hostname.into(),
            portname: None,
            default_port: None,
            service: None,
            protocol: "tcp".to_string(),
            order: order::default_order(),
            lookup,
            retry_timer: Timer::new(),
            max_retries: 4,
            attempts: 0,
            phase: Phase::Idle,
            result: None,
            error: None,
        }
    }

    /// Overrides the address-family preference order (`dns:order`).
    pub fn set_order(&mut self, order: Vec<AddressFamily>) {
        self.order = order;
    }

    /// Requests an `SRV`-record lookup ahead of the plain host lookup, for
    /// `_service._proto.hostname`.
    pub fn set_service(&mut self, service: impl Into<String>, protocol: impl Into<String>) {
        self.service = Some(service.into());
        self.protocol = protocol.into();
    }

    /// Sets the fallback port used if no explicit port or service
    /// resolution applies.
    pub fn set_default_port(&mut self, port: u16) {
        self.default_port = Some(port);
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey {
            hostname: self.hostname.clone(),
            port: self.portname.clone(),
            default_port: self.default_port.map(|p| p.to_string()),
            service: self.service.clone(),
            protocol: Some(self.protocol.clone()),
        }
    }

    /// Runs the whole resolution synchronously against `cache`, updating
    /// the cache on success. Exposed separately from [`Task::step`] since
    /// every backend here is synchronous; a forked-helper backend would
    /// instead drive this incrementally across several `step` calls.
    pub fn resolve(&mut self, cache: &mut ResolverCache) -> Result<Vec<SocketAddr>, Message> {
        let key = self.cache_key();
        if let Some(cached) = cache.lookup(&key) {
            self.result = Some(cached.clone());
            self.phase = Phase::Done;
            return Ok(cached);
        }

        let port = match self.resolve_port() {
            Ok(port) => port,
            Err(message) => {
                self.error = Some(message.clone());
                self.phase = Phase::Done;
                return Err(message);
            }
        };

        let targets = self.srv_targets();
        let mut addresses = Vec::new();
        for (host, port) in targets.unwrap_or_else(|| vec![(self.hostname.clone(), port)]) {
            match self.lookup_with_retry(&host) {
                Ok(resolved) => {
                    addresses.extend(resolved.into_iter().map(|addr| {
                        let mut addr = addr;
                        addr.set_port(port);
                        addr
                    }));
                }
                Err(message) => {
                    self.error = Some(message.clone());
                    self.phase = Phase::Done;
                    return Err(message);
                }
            }
        }

        order::sort_by_preference(&mut addresses, &self.order, family_of);
        cache.insert(key, addresses.clone());
        self.result = Some(addresses.clone());
        self.phase = Phase::Done;
        Ok(addresses)
    }

    fn resolve_port(&mut self) -> Result<u16, Message> {
        if let Some(service) = self.service.clone() {
            return self
                .lookup
                .lookup_service(&service, &self.protocol)
                .map_err(|text| Message::error(1, format!("{service}: {text}")).with_role(Role::Resolver));
        }
        if let Some(portname) = &self.portname {
            if let Ok(port) = portname.parse::<u16>() {
                return Ok(port);
            }
            return self
                .lookup
                .lookup_service(portname, &self.protocol)
                .map_err(|text| Message::error(1, format!("{portname}: {text}")).with_role(Role::Resolver));
        }
        self.default_port
            .ok_or_else(|| Message::error(1, "no port, service, or default port given").with_role(Role::Resolver))
    }

    fn srv_targets(&mut self) -> Option<Vec<(String, u16)>> {
        let service = self.service.as_ref()?.clone();
        let protocol = self.protocol.clone();
        let records = self.lookup.lookup_srv(&service, &protocol, &self.hostname);
        if records.is_empty() {
            return None;
        }
        let ordered = srv::order_records(&records);
        Some(ordered.into_iter().map(|r| (r.target, r.port)).collect())
    }

    fn lookup_with_retry(&mut self, host: &str) -> Result<Vec<SocketAddr>, Message> {
        loop {
            self.attempts += 1;
            match self.lookup.lookup_host(host) {
                Ok(addresses) => return Ok(addresses),
                Err(text) if self.attempts <= self.max_retries && is_transient(&text) => {
                    self.phase = Phase::Backoff;
                    self.retry_timer.set(backoff_delay(self.attempts));
                    continue;
                }
                Err(text) => return Err(Message::error(1, format!("{host}: {text}")).with_role(Role::Resolver)),
            }
        }
    }

    /// The resolved addresses, once [`Resolver::resolve`] has completed
    /// successfully.
    #[must_use]
    pub fn result(&self) -> Option<&[SocketAddr]> {
        self.result.as_deref()
    }

    /// The failure, if resolution completed unsuccessfully.
    #[must_use]
    pub fn error(&self) -> Option<&Message> {
        self.error.as_ref()
    }
}

fn family_of(addr: &SocketAddr) -> AddressFamily {
    match addr {
        SocketAddr::V4(_) => AddressFamily::Inet,
        SocketAddr::V6(_) => AddressFamily::Inet6,
    }
}

fn is_transient(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("try again") || lower.contains("temporary failure")
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(200 * u64::from(attempt.min(8)))
}

impl<L: NameLookup> Task for Resolver<L> {
    fn step(&mut self) -> Status {
        match self.phase {
            Phase::Idle | Phase::Done => Status::Stall,
            Phase::Backoff => {
                if self.retry_timer.stopped() {
                    Status::Moved
                } else {
                    Status::Stall
                }
            }
        }
    }

    fn log_context(&self) -> Option<&str> {
        Some(&self.hostname)
    }
}
