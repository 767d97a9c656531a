//! CrossRate FX Engine
//!
//! Rate-graph engine that composes a sparse set of configured pairwise
//! exchange rates into derived rates for arbitrary currency pairs.
//!
//! # Features
//!
//! - Reciprocal reverse-edge synthesis for one-way configured rates
//! - Exhaustive simple-path enumeration with shortest-path selection
//! - Memoized lookups over a pluggable cache store
//! - Atomic table reload with full cache invalidation
//!
//! # Example
//!
//! ```rust,ignore
//! use crossrate_fx::FxEngine;
//! use crossrate_common::Currency;
//!
//! let engine = FxEngine::new();
//! engine.load_configuration([
//!     ("USD", "CAD", 1.34),
//!     ("CAD", "GBP", 0.58),
//!     ("USD", "EUR", 0.86),
//! ])?;
//!
//! // Derived over USD -> CAD -> GBP, then served from cache.
//! let rate = engine.get_rate(&Currency::usd(), &Currency::gbp())?;
//! let pounds = engine.convert(&Currency::usd(), &Currency::gbp(), 250.0)?;
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod graph;

pub use cache::{CacheStats, MemoryStore, RateCache, RateStore};
pub use engine::{FxEngine, FxEngineStats};
pub use error::FxError;
pub use graph::{RateEdge, RateGraph, RatePath, RateResolution};
