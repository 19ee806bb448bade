//! Simulated market data provider.
//!
//! Serves a fixed calendar state and per-pair reference prices. Suitable for
//! paper runs and testing; live deployments plug a real provider into the
//! same port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{MarketDataError, MarketDataPort};
use crate::domain::shared::{FxPair, Timestamp};

/// Simulated market data adapter.
#[derive(Debug)]
pub struct SimulatedMarketData {
    open: AtomicBool,
    prices: RwLock<HashMap<FxPair, Decimal>>,
}

impl Default for SimulatedMarketData {
    fn default() -> Self {
        Self {
            open: AtomicBool::new(true),
            prices: RwLock::new(HashMap::new()),
        }
    }
}

impl SimulatedMarketData {
    /// Create a new adapter with the market open and no quotes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the market reports open.
    pub fn set_market_open(&self, open: bool) {
        self.open.store(open, Ordering::Release);
    }

    /// Set the reference price for a pair.
    pub fn set_price(&self, pair: FxPair, price: Decimal) {
        let mut prices = self.prices.write().unwrap_or_else(PoisonError::into_inner);
        prices.insert(pair, price);
    }
}

#[async_trait]
impl MarketDataPort for SimulatedMarketData {
    async fn is_market_open(
        &self,
        _pair: &FxPair,
        _time: Timestamp,
    ) -> Result<bool, MarketDataError> {
        Ok(self.open.load(Ordering::Acquire))
    }

    async fn reference_price(
        &self,
        pair: &FxPair,
        _time: Timestamp,
    ) -> Result<Option<Decimal>, MarketDataError> {
        let prices = self.prices.read().unwrap_or_else(PoisonError::into_inner);
        Ok(prices.get(pair).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> FxPair {
        FxPair::new("EUR", "USD")
    }

    fn time() -> Timestamp {
        Timestamp::parse("2024-06-03T17:00:00Z").unwrap()
    }

    #[tokio::test]
    async fn market_defaults_to_open() {
        let md = SimulatedMarketData::new();
        assert!(md.is_market_open(&pair(), time()).await.unwrap());

        md.set_market_open(false);
        assert!(!md.is_market_open(&pair(), time()).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_pair_has_no_quote() {
        let md = SimulatedMarketData::new();
        assert!(md.reference_price(&pair(), time()).await.unwrap().is_none());

        md.set_price(pair(), dec!(1.0852));
        assert_eq!(
            md.reference_price(&pair(), time()).await.unwrap(),
            Some(dec!(1.0852))
        );
    }
}
