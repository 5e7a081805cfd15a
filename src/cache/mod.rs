// src/cache/mod.rs
//! In-process content cache with tag and path invalidation.
//!
//! Cached values are stored as serialized JSON with the tags and site path
//! they belong to. Revalidation drops entries by tag or path; the next read
//! recomputes them from the content source.

mod manager;

pub use manager::{CacheManager, CacheScope, CacheStats, InvalidationRecord};
