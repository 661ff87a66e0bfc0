//! Thread-safe claim ledger for idempotent consumption
//!
//! This module provides the `InMemoryDedupStore` struct, which records the ids
//! of transactions already claimed for processing during this process
//! lifetime.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) keyed by transaction id.
//! `DashMap::insert` takes the shard's write lock, inserts, and reports the
//! previous value before releasing it, which makes "was it there before?" and
//! "it is there now" a single critical section. That is the whole claim.
//!
//! # Lifetime
//!
//! Entries are never removed or expired. The store is not persisted: a
//! restarted process starts with an empty ledger, and two processes each
//! holding their own store do not see each other's claims.

use crate::core::traits::DedupStore;
use dashmap::DashMap;

/// In-memory claim ledger
///
/// Cheap to share: wrap it in an `Arc` and hand clones to every consumer of
/// the process.
#[derive(Debug, Default)]
pub struct InMemoryDedupStore {
    /// Claimed transaction ids
    ///
    /// Value is the "seen" marker; only key membership is ever read.
    claimed: DashMap<String, bool>,
}

impl InMemoryDedupStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            claimed: DashMap::new(),
        }
    }
}

impl DedupStore for InMemoryDedupStore {
    fn try_claim(&self, id: &str) -> bool {
        self.claimed.insert(id.to_owned(), true).is_none()
    }

    fn is_claimed(&self, id: &str) -> bool {
        self.claimed.contains_key(id)
    }

    fn len(&self) -> usize {
        self.claimed.len()
    }
}
