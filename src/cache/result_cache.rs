//! Memoized read results.
//!
//! A select computes a snapshot of the matching rows; the snapshot is kept
//! here under a [`Fingerprint`] of the table and predicate. Every mutation
//! of a table calls [`ResultCache::invalidate`] for that table, which drops
//! the full-table entry and every predicate entry alike. The cache is a
//! derived view: clearing it at any point only costs a rescan.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::{core::types::Value, db::predicate::Predicate};

/// Cache key for a read query.
///
/// The table name is kept as its own field so invalidation matches on it
/// exactly instead of on a string prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    table: String,
    predicate: Option<(String, Value)>,
}

impl Fingerprint {
    /// Key for reading the whole table.
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            predicate: None,
        }
    }

    /// Key for reading the rows of `table` matching `predicate`.
    pub fn filtered(table: &str, predicate: &Predicate) -> Self {
        Self {
            table: table.to_string(),
            predicate: Some((predicate.column.clone(), predicate.value.clone())),
        }
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the compute function.
    pub misses: u64,
    /// Entries dropped by invalidation.
    pub invalidated: u64,
}

/// A per-process cache of read snapshots.
///
/// Not persisted and without expiry; entries live until their table is
/// invalidated or the cache is cleared.
#[derive(Debug)]
pub struct ResultCache<R> {
    entries: HashMap<Fingerprint, Arc<R>>,
    stats: CacheStats,
}

impl<R> Default for ResultCache<R> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }
}

impl<R> ResultCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot stored under `key`, computing and storing it
    /// first if there is none.
    ///
    /// On a hit `compute` is not called.
    pub fn get_or_compute<F>(&mut self, key: Fingerprint, compute: F) -> Arc<R>
    where
        F: FnOnce() -> R,
    {
        if let Some(hit) = self.entries.get(&key) {
            self.stats.hits += 1;
            debug!(table = %key.table, predicate = ?key.predicate, "result cache hit");
            return Arc::clone(hit);
        }

        self.stats.misses += 1;
        debug!(table = %key.table, predicate = ?key.predicate, "result cache miss");

        let result = Arc::new(compute());
        self.entries.insert(key, Arc::clone(&result));
        result
    }

    /// Looks up `key` without computing anything or touching the counters.
    pub fn peek(&self, key: &Fingerprint) -> Option<Arc<R>> {
        self.entries.get(key).cloned()
    }

    /// Drops every entry that belongs to `table`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, table: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.table != table);
        let removed = before - self.entries.len();

        if removed > 0 {
            self.stats.invalidated += removed as u64;
            debug!(table, removed, "result cache invalidated");
        }

        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn by_age(age: i64) -> Predicate {
        Predicate::new("age", Value::Integer(age))
    }

    #[test]
    fn test_second_lookup_does_not_recompute() {
        let mut cache: ResultCache<Vec<i64>> = ResultCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            vec![1, 2, 3]
        };

        let first = cache.get_or_compute(Fingerprint::table("users"), compute);
        let second = cache.get_or_compute(Fingerprint::table("users"), || unreachable!());

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_fingerprints_distinguish_predicates() {
        assert_ne!(
            Fingerprint::filtered("users", &by_age(30)),
            Fingerprint::filtered("users", &by_age(31))
        );
        assert_ne!(
            Fingerprint::filtered("users", &by_age(30)),
            Fingerprint::table("users")
        );
        assert_ne!(
            Fingerprint::filtered("users", &Predicate::new("age", Value::Text("30".into()))),
            Fingerprint::filtered("users", &by_age(30))
        );
    }

    #[test]
    fn test_invalidate_drops_predicate_entries_of_table_only() {
        let mut cache: ResultCache<&str> = ResultCache::new();
        cache.get_or_compute(Fingerprint::table("users"), || "all users");
        cache.get_or_compute(Fingerprint::filtered("users", &by_age(30)), || "thirty");
        cache.get_or_compute(Fingerprint::filtered("users_old", &by_age(30)), || "old");
        cache.get_or_compute(Fingerprint::table("orders"), || "all orders");

        assert_eq!(cache.invalidate("users"), 2);

        assert!(cache.peek(&Fingerprint::table("users")).is_none());
        assert!(cache.peek(&Fingerprint::filtered("users", &by_age(30))).is_none());
        assert!(cache.peek(&Fingerprint::filtered("users_old", &by_age(30))).is_some());
        assert!(cache.peek(&Fingerprint::table("orders")).is_some());
        assert_eq!(cache.stats().invalidated, 2);
    }

    #[test]
    fn test_invalidate_unknown_table_is_noop() {
        let mut cache: ResultCache<u8> = ResultCache::new();
        cache.get_or_compute(Fingerprint::table("a"), || 1);
        assert_eq!(cache.invalidate("b"), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache: ResultCache<u8> = ResultCache::new();
        cache.get_or_compute(Fingerprint::table("a"), || 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
