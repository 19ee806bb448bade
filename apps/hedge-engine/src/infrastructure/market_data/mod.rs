//! Market Data Adapters

pub mod simulated;

pub use simulated::SimulatedMarketData;
