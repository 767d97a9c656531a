//! Memoized rate lookups over a pluggable store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossrate_common::{Currency, CurrencyPair};
use dashmap::DashMap;
use tracing::debug;

use crate::error::FxResult;
use crate::graph::RateGraph;

/// Storage contract for memoized rates.
///
/// Any keyed store satisfies this; the cache assumes nothing about
/// eviction, TTL, or persistence. Keys are ordered pairs, so the entries
/// for `A/B` and `B/A` are independent even though their values are
/// reciprocal.
pub trait RateStore: Send + Sync {
    /// Look up a stored rate.
    fn get(&self, pair: &CurrencyPair) -> Option<f64>;

    /// Store a rate.
    fn set(&self, pair: CurrencyPair, rate: f64);

    /// Drop every entry.
    fn clear(&self);
}

/// In-process store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<CurrencyPair, f64>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RateStore for MemoryStore {
    fn get(&self, pair: &CurrencyPair) -> Option<f64> {
        self.entries.get(pair).map(|entry| *entry)
    }

    fn set(&self, pair: CurrencyPair, rate: f64) {
        self.entries.insert(pair, rate);
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

impl<S: RateStore + ?Sized> RateStore for Arc<S> {
    fn get(&self, pair: &CurrencyPair) -> Option<f64> {
        (**self).get(pair)
    }

    fn set(&self, pair: CurrencyPair, rate: f64) {
        (**self).set(pair, rate)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// Memoizing front for [`RateGraph::resolve`].
pub struct RateCache {
    store: Box<dyn RateStore>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RateCache {
    /// Create a cache over the default in-memory store.
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    /// Create a cache over a custom store.
    pub fn with_store(store: Box<dyn RateStore>) -> Self {
        Self {
            store,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the effective rate for a pair, resolving and memoizing on miss.
    ///
    /// Failures are never cached: a pair that is unreachable now may
    /// become resolvable after the next configuration load, and a failed
    /// search is cheap to repeat. Concurrent misses for the same pair may
    /// resolve redundantly; every writer stores the same deterministic
    /// value, so the duplication is harmless.
    pub fn get_rate(&self, graph: &RateGraph, from: &Currency, to: &Currency) -> FxResult<f64> {
        let pair = CurrencyPair::new(from.clone(), to.clone());

        if let Some(rate) = self.store.get(&pair) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(pair = %pair, rate, "cache hit");
            return Ok(rate);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let resolution = graph.resolve(from, to)?;
        debug!(
            pair = %pair,
            rate = resolution.rate,
            path = %resolution.path,
            "cache miss, resolved"
        );
        self.store.set(pair, resolution.rate);

        Ok(resolution.rate)
    }

    /// Drop every cached rate.
    pub fn invalidate(&self) {
        self.store.clear();
    }

    /// Hit and miss counters since construction.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FxError;

    fn demo_graph() -> RateGraph {
        RateGraph::from_edges([
            ("USD", "CAD", 1.34).into(),
            ("CAD", "GBP", 0.58).into(),
            ("USD", "EUR", 0.86).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_second_lookup_hits_cache() {
        let graph = demo_graph();
        let cache = RateCache::new();

        let first = cache
            .get_rate(&graph, &Currency::usd(), &Currency::gbp())
            .unwrap();
        let second = cache
            .get_rate(&graph, &Currency::usd(), &Currency::gbp())
            .unwrap();

        assert_eq!(first.to_bits(), second.to_bits());

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_directional_entries_are_independent() {
        let graph = demo_graph();
        let store = Arc::new(MemoryStore::new());
        let cache = RateCache::with_store(Box::new(Arc::clone(&store)));

        cache
            .get_rate(&graph, &Currency::usd(), &Currency::cad())
            .unwrap();

        assert_eq!(store.len(), 1);

        // The reverse direction is its own miss, not a reciprocal read.
        cache
            .get_rate(&graph, &Currency::cad(), &Currency::usd())
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let graph = demo_graph();
        let store = Arc::new(MemoryStore::new());
        let cache = RateCache::with_store(Box::new(Arc::clone(&store)));

        for _ in 0..2 {
            let result = cache.get_rate(&graph, &Currency::usd(), &Currency::new("XYZ"));
            assert!(matches!(result, Err(FxError::NoConversionPath { .. })));
        }

        assert!(store.is_empty());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_invalidate_clears_entries() {
        let graph = demo_graph();
        let store = Arc::new(MemoryStore::new());
        let cache = RateCache::with_store(Box::new(Arc::clone(&store)));

        cache
            .get_rate(&graph, &Currency::usd(), &Currency::eur())
            .unwrap();
        assert_eq!(store.len(), 1);

        cache.invalidate();

        assert!(store.is_empty());
    }
}
