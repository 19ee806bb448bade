//! Market Data Port (Driven Port)
//!
//! Interface for trading-calendar and reference-price lookups.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::shared::{FxPair, Timestamp};

/// Market data error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MarketDataError {
    /// Connection error.
    #[error("Market data connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// The pair is not covered by the provider.
    #[error("No market data for pair: {pair}")]
    UnknownPair {
        /// The pair.
        pair: String,
    },
}

/// Port for market calendar and reference prices.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Whether the pair's market is open for trading at `time`.
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot be reached.
    async fn is_market_open(&self, pair: &FxPair, time: Timestamp)
        -> Result<bool, MarketDataError>;

    /// Latest executable reference price at `time`, `None` when no quote is
    /// available.
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot be reached.
    async fn reference_price(
        &self,
        pair: &FxPair,
        time: Timestamp,
    ) -> Result<Option<Decimal>, MarketDataError>;
}
