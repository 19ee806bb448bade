//! Venue Adapters

pub mod simulated;

pub use simulated::SimulatedVenue;
