//! Main FX engine implementation.

use parking_lot::RwLock;
use tracing::{info, instrument};

use crossrate_common::Currency;

use crate::cache::{CacheStats, RateCache, RateStore};
use crate::error::FxResult;
use crate::graph::{RateEdge, RateGraph};

/// The main conversion engine.
///
/// Owns the current rate table behind a read-write lock together with a
/// cache of derived rates. Queries hold the read lock for the whole
/// resolve-and-store sequence, and a reload swaps the table and clears
/// the cache under the write lock, so a query observes either the old
/// generation or the new one, never a mix.
pub struct FxEngine {
    table: RwLock<RateGraph>,
    cache: RateCache,
}

impl FxEngine {
    /// Create an engine with an empty rate table and the default store.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(RateGraph::default()),
            cache: RateCache::new(),
        }
    }

    /// Create an engine over a custom cache store.
    pub fn with_store(store: Box<dyn RateStore>) -> Self {
        Self {
            table: RwLock::new(RateGraph::default()),
            cache: RateCache::with_store(store),
        }
    }

    /// Replace the rate table.
    ///
    /// The new table is validated and built before the current one is
    /// touched; a rejected configuration leaves the previous table and its
    /// cached rates fully intact. On success the table swap and the cache
    /// invalidation happen under one write lock, so no stale derived rate
    /// is ever served against the new table.
    pub fn load_configuration<I, E>(&self, edges: I) -> FxResult<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<RateEdge>,
    {
        let graph = RateGraph::from_edges(edges.into_iter().map(Into::into))?;
        let edge_count = graph.len();

        let mut table = self.table.write();
        *table = graph;
        self.cache.invalidate();

        info!(edges = edge_count, "rate table loaded");
        Ok(())
    }

    /// Effective conversion rate from one currency to another.
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub fn get_rate(&self, from: &Currency, to: &Currency) -> FxResult<f64> {
        let table = self.table.read();
        self.cache.get_rate(&table, from, to)
    }

    /// Convert an amount between currencies.
    pub fn convert(&self, from: &Currency, to: &Currency, amount: f64) -> FxResult<f64> {
        Ok(amount * self.get_rate(from, to)?)
    }

    /// Drop all cached rates without touching the table.
    ///
    /// Taken under the write lock so no in-flight query can re-store a
    /// value between the clear and the return.
    pub fn clear_cache(&self) {
        let _table = self.table.write();
        self.cache.invalidate();
    }

    /// Engine counters.
    pub fn stats(&self) -> FxEngineStats {
        FxEngineStats {
            edges: self.table.read().len(),
            cache: self.cache.stats(),
        }
    }
}

impl Default for FxEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine statistics.
#[derive(Debug, Clone, Copy)]
pub struct FxEngineStats {
    /// Edges in the current table, synthesized reverses included.
    pub edges: usize,
    /// Cache hit and miss counters.
    pub cache: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FxError;

    fn setup_engine() -> FxEngine {
        let engine = FxEngine::new();
        engine
            .load_configuration([
                ("USD", "CAD", 1.34),
                ("CAD", "GBP", 0.58),
                ("USD", "EUR", 0.86),
            ])
            .unwrap();
        engine
    }

    #[test]
    fn test_direct_rate() {
        let engine = setup_engine();
        let rate = engine.get_rate(&Currency::usd(), &Currency::eur()).unwrap();

        assert_eq!(rate, 0.86);
    }

    #[test]
    fn test_composed_rate() {
        let engine = setup_engine();

        // No direct USD/GBP edge; composed over USD/CAD then CAD/GBP.
        let rate = engine.get_rate(&Currency::usd(), &Currency::gbp()).unwrap();

        assert_eq!(rate, 1.34 * 0.58);
    }

    #[test]
    fn test_reciprocal_composition() {
        let engine = setup_engine();

        // Composed through the synthesized CAD/USD edge.
        let rate = engine.get_rate(&Currency::cad(), &Currency::eur()).unwrap();

        assert_eq!(rate, (1.0 / 1.34) * 0.86);
    }

    #[test]
    fn test_synthesized_reverse_rate() {
        let engine = setup_engine();
        let rate = engine.get_rate(&Currency::cad(), &Currency::usd()).unwrap();

        assert_eq!(rate, 1.0 / 1.34);
    }

    #[test]
    fn test_identity_rate() {
        let engine = setup_engine();

        assert_eq!(
            engine.get_rate(&Currency::gbp(), &Currency::gbp()).unwrap(),
            1.0
        );

        // Identity holds even for currencies the table has never seen.
        let unknown = Currency::new("XXX");
        assert_eq!(engine.get_rate(&unknown, &unknown).unwrap(), 1.0);
    }

    #[test]
    fn test_unreachable_pair() {
        let engine = setup_engine();
        let result = engine.get_rate(&Currency::usd(), &Currency::new("XYZ"));

        assert!(matches!(result, Err(FxError::NoConversionPath { .. })));
    }

    #[test]
    fn test_convert() {
        let engine = setup_engine();
        let converted = engine
            .convert(&Currency::usd(), &Currency::cad(), 100.0)
            .unwrap();

        assert_eq!(converted, 100.0 * 1.34);
    }

    #[test]
    fn test_convert_unreachable_propagates() {
        let engine = setup_engine();
        let result = engine.convert(&Currency::usd(), &Currency::new("XYZ"), 100.0);

        assert!(matches!(result, Err(FxError::NoConversionPath { .. })));
    }

    #[test]
    fn test_repeated_lookup_is_cache_hit() {
        let engine = setup_engine();

        let first = engine.get_rate(&Currency::usd(), &Currency::gbp()).unwrap();
        let second = engine.get_rate(&Currency::usd(), &Currency::gbp()).unwrap();

        assert_eq!(first.to_bits(), second.to_bits());

        let stats = engine.stats();
        assert_eq!(stats.cache.misses, 1);
        assert_eq!(stats.cache.hits, 1);
    }

    #[test]
    fn test_reload_invalidates_cached_rates() {
        let engine = setup_engine();

        assert_eq!(
            engine.get_rate(&Currency::usd(), &Currency::cad()).unwrap(),
            1.34
        );

        engine
            .load_configuration([("USD", "CAD", 1.50)])
            .unwrap();

        // The previously cached rate must not survive the reload.
        assert_eq!(
            engine.get_rate(&Currency::usd(), &Currency::cad()).unwrap(),
            1.50
        );
    }

    #[test]
    fn test_rejected_reload_keeps_previous_table() {
        let engine = setup_engine();

        assert_eq!(
            engine.get_rate(&Currency::usd(), &Currency::eur()).unwrap(),
            0.86
        );

        let result = engine.load_configuration([
            ("USD", "CAD", 1.50),
            ("USD", "CAD", 1.60),
        ]);
        assert!(matches!(result, Err(FxError::DuplicateEdge(_))));

        // Old table and cache still serve.
        assert_eq!(
            engine.get_rate(&Currency::usd(), &Currency::eur()).unwrap(),
            0.86
        );
        assert_eq!(
            engine.get_rate(&Currency::usd(), &Currency::cad()).unwrap(),
            1.34
        );
    }

    #[test]
    fn test_clear_cache_recomputes() {
        let engine = setup_engine();

        engine.get_rate(&Currency::usd(), &Currency::gbp()).unwrap();
        engine.clear_cache();
        engine.get_rate(&Currency::usd(), &Currency::gbp()).unwrap();

        assert_eq!(engine.stats().cache.misses, 2);
    }

    #[test]
    fn test_stats_edge_count() {
        let engine = setup_engine();

        // 3 configured edges plus 3 synthesized reverses.
        assert_eq!(engine.stats().edges, 6);
    }

    #[test]
    fn test_shortest_path_wins_over_longer_composition() {
        let engine = FxEngine::new();
        engine
            .load_configuration([
                ("AAA", "BBB", 2.0),
                ("BBB", "CCC", 3.0),
                ("CCC", "DDD", 4.0),
                ("DDD", "AAA", 0.04),
            ])
            .unwrap();

        // AAA to DDD: the synthesized one-edge AAA/DDD reverse beats the
        // three-edge AAA/BBB/CCC/DDD composition (rate 24).
        let rate = engine
            .get_rate(&Currency::new("AAA"), &Currency::new("DDD"))
            .unwrap();

        assert_eq!(rate, 1.0 / 0.04);
    }
}
