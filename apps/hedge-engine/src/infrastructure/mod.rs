//! Infrastructure Layer
//!
//! Adapters (implementations) for the ports defined in the application
//! layer. Following hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**: Implement ports for external systems
//!   - `persistence/`: Repository adapters
//!   - `broker/`: Broker session plumbing (client-id pool)
//!   - `market_data/`: Calendar and reference-price adapters
//!   - `venue/`: Execution venue adapters

pub mod broker;
pub mod market_data;
pub mod persistence;
pub mod venue;
