//! # Overview
//!
//! `resolver` turns a hostname, optional port/service, and address-family
//! preference into an ordered list of addresses ready for a connector to
//! try in turn. It sits ahead of every control and data connection: the
//! control-protocol session hands it a hostname at `CONNECTING_STATE` and
//! walks the returned address list until one connects.
//!
//! # Design
//!
//! - [`order`] parses the `dns:order` preference list and sorts resolved
//!   addresses by family.
//! - [`srv`] implements RFC 2782's priority/weighted-random ordering for
//!   `SRV` lookups.
//! - [`cache`] is a process-wide cache of address lists, keyed on the five
//!   inputs that together determine a lookup's answer.
//! - [`child_protocol`] is the wire format a forked lookup helper uses to
//!   report back to the resolver task without blocking the scheduler.
//! - [`resolver::Resolver`] is the task itself: a generic over
//!   [`resolver::NameLookup`] so tests (and, eventually, a forked-helper
//!   backend) can supply lookups without opening a real socket.
//!
//! # See also
//!
//! - `protocol`'s `Session`, whose `begin_connect` consumes a resolved
//!   address list.

pub mod cache;
pub mod child_protocol;
pub mod order;
pub mod resolver;
pub mod srv;

pub use cache::{CacheKey, ResolverCache};
pub use child_protocol::{ChildMessage, ChildProtocolError};
pub use order::AddressFamily;
pub use resolver::{NameLookup, Resolver};
pub use srv::SrvRecord;
