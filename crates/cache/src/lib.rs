//! # Overview
//!
//! The process-wide listing cache: raw `LIST`/`MLSD`/`NLST` payload bytes
//! keyed by session identity, path, and mode, plus a small directory/file
//! shape table a `Lister` consults before deciding whether to `CWD` or
//! probe a parent. Distinct from [`resolver`]'s DNS cache, which this
//! crate does not depend on.
//!
//! # Design
//!
//! Eviction is FIFO by insertion order once a total-size bound is
//! exceeded, plus a per-entry expiry timer — the same discipline
//! `resolver`'s cache uses, grounded on the original's generic
//! size-bounded, timer-trimmed `Cache` base.
//!
//! # Invariants
//!
//! Lookups do not pin entries: a `get` followed by a later `put` that
//! triggers eviction can invalidate the first call's borrow window, so
//! callers must copy bytes out before yielding to the scheduler.

pub mod key;
pub mod store;

pub use key::{CacheKey, Mode};
pub use store::ListingCache;
