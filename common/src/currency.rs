//! Currency codes and ordered currency pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency code.
///
/// Codes are opaque uppercase tokens (typically ISO 4217 style) and are
/// not validated against any external registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn cad() -> Self {
        Self::new("CAD")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An ordered currency pair.
///
/// The pair is directional: `BASE/QUOTE` and `QUOTE/BASE` are distinct
/// values everywhere they are used as keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Base currency (the one being converted from).
    pub base: Currency,
    /// Quote currency (the one being converted to).
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_uppercases_code() {
        assert_eq!(Currency::new("usd"), Currency::usd());
        assert_eq!(Currency::new("Cad").code(), "CAD");
    }

    #[test]
    fn test_pair_display() {
        let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
        assert_eq!(pair.to_string(), "USD/EUR");
    }

    #[test]
    fn test_pair_inverse() {
        let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
        let inverse = pair.inverse();

        assert_eq!(inverse.base, Currency::eur());
        assert_eq!(inverse.quote, Currency::usd());
        assert_ne!(pair, inverse);
    }
}
