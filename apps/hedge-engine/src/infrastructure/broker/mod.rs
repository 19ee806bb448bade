//! Broker Adapters
//!
//! Session-level plumbing shared by venue adapters.

pub mod client_ids;

pub use client_ids::{ClientIdError, ClientIdPool};
