//! Application Layer
//!
//! Use cases and the ports they depend on. Orchestrates the domain; owns no
//! business rules of its own.

pub mod ports;
pub mod use_cases;
