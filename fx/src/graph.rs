//! Rate graph construction and path resolution.
//!
//! Currencies are nodes and known conversion rates are directed, weighted
//! edges. For every configured edge with no configured reverse, the
//! reciprocal reverse edge is synthesized, so a one-way table still
//! connects both directions. Pairs without a direct edge are resolved by
//! enumerating every simple path between them and composing the rates of
//! the shortest one.

use std::collections::HashMap;
use std::fmt;

use crossrate_common::{Currency, CurrencyPair};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FxError, FxResult};

/// A directed conversion edge: one unit of the base currency is worth
/// `rate` units of the quote currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEdge {
    /// The ordered pair this edge converts between.
    #[serde(flatten)]
    pub pair: CurrencyPair,
    /// Units of quote currency per unit of base currency.
    pub rate: f64,
}

impl RateEdge {
    /// Create a new edge.
    pub fn new(pair: CurrencyPair, rate: f64) -> Self {
        Self { pair, rate }
    }

    /// The reciprocal edge, converting quote back to base.
    pub fn reciprocal(&self) -> Self {
        Self {
            pair: self.pair.inverse(),
            rate: 1.0 / self.rate,
        }
    }
}

impl From<(&str, &str, f64)> for RateEdge {
    fn from((base, quote, rate): (&str, &str, f64)) -> Self {
        Self::new(
            CurrencyPair::new(Currency::new(base), Currency::new(quote)),
            rate,
        )
    }
}

impl fmt::Display for RateEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.pair, self.rate)
    }
}

/// An ordered chain of edges where each edge's quote currency is the next
/// edge's base currency and no currency appears twice.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePath {
    edges: Vec<RateEdge>,
}

impl RatePath {
    fn new(edges: Vec<RateEdge>) -> Self {
        Self { edges }
    }

    /// The empty path used for same-currency resolutions.
    fn identity() -> Self {
        Self { edges: Vec::new() }
    }

    /// The edges of the path, in conversion order.
    pub fn edges(&self) -> &[RateEdge] {
        &self.edges
    }

    /// Number of edges in the path.
    pub fn hops(&self) -> usize {
        self.edges.len()
    }

    /// Whether the path has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Product of the edge rates, accumulated in path order.
    ///
    /// Plain IEEE multiplication: the same path always yields the same
    /// bits, and the empty path yields exactly 1.0.
    pub fn derived_rate(&self) -> f64 {
        self.edges.iter().fold(1.0, |acc, edge| acc * edge.rate)
    }
}

impl fmt::Display for RatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.edges.is_empty() {
            return write!(f, "(identity)");
        }
        for (i, edge) in self.edges.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", edge)?;
        }
        Ok(())
    }
}

/// Outcome of resolving a currency pair against the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct RateResolution {
    /// The queried pair.
    pub pair: CurrencyPair,
    /// Effective conversion rate for the pair.
    pub rate: f64,
    /// The path the rate was composed from; empty for identity.
    pub path: RatePath,
}

impl RateResolution {
    fn identity(pair: CurrencyPair) -> Self {
        Self {
            pair,
            rate: 1.0,
            path: RatePath::identity(),
        }
    }

    fn from_path(pair: CurrencyPair, path: RatePath) -> Self {
        Self {
            rate: path.derived_rate(),
            pair,
            path,
        }
    }
}

/// The set of known conversion edges, indexed for direct lookup and
/// ordered traversal.
///
/// Edges keep insertion order: configured edges first, then synthesized
/// reverses in derivation order. Traversal follows this ordering, so path
/// enumeration and tie-breaking between equal-length paths are
/// reproducible for a given configuration.
#[derive(Debug, Default)]
pub struct RateGraph {
    edges: Vec<RateEdge>,
    direct: HashMap<CurrencyPair, usize>,
    outgoing: HashMap<Currency, Vec<usize>>,
}

impl RateGraph {
    /// Build a graph from configured edges.
    ///
    /// Rejects self-loops, non-positive or non-finite rates, and duplicate
    /// ordered pairs. For every configured edge with no configured
    /// reverse, the reciprocal reverse edge is synthesized; synthesized
    /// edges are never themselves reversed.
    pub fn from_edges<I>(configured: I) -> FxResult<Self>
    where
        I: IntoIterator<Item = RateEdge>,
    {
        let mut graph = Self::default();

        for edge in configured {
            if edge.pair.base == edge.pair.quote {
                return Err(FxError::SelfLoopEdge(edge.pair.base));
            }
            if !edge.rate.is_finite() || edge.rate <= 0.0 {
                return Err(FxError::InvalidRate {
                    pair: edge.pair,
                    rate: edge.rate,
                });
            }
            graph.insert(edge)?;
        }

        let configured_count = graph.edges.len();
        for idx in 0..configured_count {
            let reverse_pair = graph.edges[idx].pair.inverse();
            if graph.direct.contains_key(&reverse_pair) {
                continue;
            }
            let reverse = graph.edges[idx].reciprocal();
            graph.insert(reverse)?;
        }

        debug!(
            configured = configured_count,
            total = graph.edges.len(),
            "rate graph built"
        );

        Ok(graph)
    }

    fn insert(&mut self, edge: RateEdge) -> FxResult<()> {
        if self.direct.contains_key(&edge.pair) {
            return Err(FxError::DuplicateEdge(edge.pair));
        }
        let idx = self.edges.len();
        self.direct.insert(edge.pair.clone(), idx);
        self.outgoing
            .entry(edge.pair.base.clone())
            .or_default()
            .push(idx);
        self.edges.push(edge);
        Ok(())
    }

    /// Total number of edges, including synthesized reverses.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// O(1) lookup of a single configured or synthesized edge.
    pub fn direct_rate(&self, pair: &CurrencyPair) -> Option<&RateEdge> {
        self.direct.get(pair).map(|&idx| &self.edges[idx])
    }

    /// Every simple path from `from` to `to`, in traversal order.
    ///
    /// Depth-first over the outgoing edges of `from`. A path is recorded
    /// the moment it reaches `to` and is not extended past it; sibling
    /// branches keep being explored so shorter alternatives are not
    /// missed. Returns an empty vector when `from` has no outgoing edges
    /// or `to` is unreachable.
    pub fn all_paths(&self, from: &Currency, to: &Currency) -> Vec<RatePath> {
        let mut found = Vec::new();
        if from == to {
            return found;
        }
        let mut visited = vec![from.clone()];
        let mut trail = Vec::new();
        self.walk(from, to, &mut visited, &mut trail, &mut found);
        found
    }

    /// One DFS step: try every outgoing edge of `at` that does not revisit
    /// a currency already on the current branch. `visited` and `trail` are
    /// backtracked on return, so each branch sees only its own prefix.
    fn walk(
        &self,
        at: &Currency,
        to: &Currency,
        visited: &mut Vec<Currency>,
        trail: &mut Vec<usize>,
        found: &mut Vec<RatePath>,
    ) {
        let Some(candidates) = self.outgoing.get(at) else {
            return;
        };
        for &idx in candidates {
            let next = &self.edges[idx].pair.quote;
            if visited.contains(next) {
                continue;
            }
            trail.push(idx);
            if next == to {
                let edges = trail.iter().map(|&i| self.edges[i].clone()).collect();
                found.push(RatePath::new(edges));
            } else {
                visited.push(next.clone());
                self.walk(next, to, visited, trail, found);
                visited.pop();
            }
            trail.pop();
        }
    }

    /// The path with the fewest edges from `from` to `to`, if any.
    ///
    /// Ties go to the first such path in traversal order.
    pub fn shortest_path(&self, from: &Currency, to: &Currency) -> Option<RatePath> {
        let paths = self.all_paths(from, to);
        debug!(from = %from, to = %to, candidates = paths.len(), "enumerated conversion paths");
        paths.into_iter().min_by_key(RatePath::hops)
    }

    /// Resolve a pair to an effective rate.
    ///
    /// Same-currency queries resolve to 1.0 along the empty path without
    /// touching the graph, so they succeed even for currencies the table
    /// has never seen. Otherwise the direct edge wins, then the shortest
    /// composable path.
    pub fn resolve(&self, from: &Currency, to: &Currency) -> FxResult<RateResolution> {
        let pair = CurrencyPair::new(from.clone(), to.clone());

        if from == to {
            return Ok(RateResolution::identity(pair));
        }

        if let Some(edge) = self.direct_rate(&pair) {
            return Ok(RateResolution::from_path(
                pair,
                RatePath::new(vec![edge.clone()]),
            ));
        }

        match self.shortest_path(from, to) {
            Some(path) => Ok(RateResolution::from_path(pair, path)),
            None => Err(FxError::NoConversionPath {
                from: from.clone(),
                to: to.clone(),
            }),
        }
    }
}
