//! FX engine error types.

use crossrate_common::{Currency, CurrencyPair};
use thiserror::Error;

/// Errors that can occur in the FX engine.
#[derive(Debug, Error)]
pub enum FxError {
    /// No sequence of known edges connects the two currencies.
    #[error("No conversion path from {from} to {to}")]
    NoConversionPath { from: Currency, to: Currency },

    /// A configured edge converts a currency to itself.
    #[error("Self-referential edge for {0}")]
    SelfLoopEdge(Currency),

    /// A configured rate is zero, negative, or not finite.
    #[error("Invalid rate {rate} for {pair}")]
    InvalidRate { pair: CurrencyPair, rate: f64 },

    /// The same ordered pair was configured more than once.
    #[error("Duplicate edge for {0}")]
    DuplicateEdge(CurrencyPair),
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
