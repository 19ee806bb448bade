//! FxPair value object for currency-pair identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// A currency pair, stored as base and quote ISO codes.
///
/// Examples: "EURUSD" (base EUR, quote USD), "GBPJPY".
/// Amounts of a pair are denominated in the base currency; prices are
/// quote-per-base.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FxPair {
    base: String,
    quote: String,
}

impl FxPair {
    /// Create a pair from base and quote currency codes.
    ///
    /// Codes are normalized to uppercase.
    #[must_use]
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }

    /// Parse a six-letter market name like "EURUSD".
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not six ASCII letters.
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        if name.len() != 6 || !name.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidValue {
                field: "fx_pair".to_string(),
                message: format!("expected six-letter market name, got '{name}'"),
            });
        }
        Ok(Self::new(&name[..3], &name[3..]))
    }

    /// Get the base currency code.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Get the quote (counter) currency code.
    #[must_use]
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Get the market name, e.g. "EURUSD".
    #[must_use]
    pub fn market_name(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Get the inverse pair (quote becomes base).
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }
}

impl fmt::Display for FxPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_case() {
        let pair = FxPair::new("eur", "usd");
        assert_eq!(pair.base(), "EUR");
        assert_eq!(pair.quote(), "USD");
        assert_eq!(pair.market_name(), "EURUSD");
    }

    #[test]
    fn parse_valid_market_name() {
        let pair = FxPair::parse("GBPJPY").unwrap();
        assert_eq!(pair.base(), "GBP");
        assert_eq!(pair.quote(), "JPY");
    }

    #[test]
    fn parse_rejects_bad_names() {
        assert!(FxPair::parse("EUR/USD").is_err());
        assert!(FxPair::parse("EURUS").is_err());
        assert!(FxPair::parse("EURUSD1").is_err());
    }

    #[test]
    fn inverse_swaps_currencies() {
        let pair = FxPair::parse("EURUSD").unwrap();
        let inv = pair.inverse();
        assert_eq!(inv.market_name(), "USDEUR");
        assert_eq!(inv.inverse(), pair);
    }

    #[test]
    fn display_matches_market_name() {
        let pair = FxPair::new("USD", "MXN");
        assert_eq!(format!("{pair}"), "USDMXN");
    }
}
