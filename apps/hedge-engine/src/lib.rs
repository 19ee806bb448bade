// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Hedge Engine - Rust Core Library
//!
//! Deterministic hedge execution and reconciliation engine for multi-account
//! FX desks.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, calculators)
//!   - `timeline`: Company events and hedge actions
//!   - `liquidity`: Desired positions, pool records, netting calculators
//!   - `tickets`: Order ticket aggregate and its lifecycle state machine
//!   - `positions`: FX positions and the snapshot-chain history
//!   - `reconciliation`: Fill-vs-position reconciliation calculator
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`VenuePort`, `MarketDataPort`)
//!   - `use_cases`: `PlanHedge`, `CycleTickets`, `Reconcile`
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: Timeline and ticket repositories, reconciliation store
//!   - `broker`: Connection-identifier pool
//!   - `market_data` / `venue`: Simulated collaborators for paper runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Engine-wide error taxonomy.
pub mod error;

/// Structured logging setup.
pub mod observability;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::liquidity::{DesiredPosition, LiquidityData, LiquidityPoolRecord};
pub use domain::positions::{FxPosition, PositionSnapshot, SnapshotChainStore};
pub use domain::reconciliation::{
    ReconciliationCalculator, ReconciliationInputs, ReconciliationOutcome,
};
pub use domain::shared::{AccountId, CompanyId, FxPair, HedgeActionId, TicketId, Timestamp};
pub use domain::tickets::{InternalState, OrderTicket, Phase, TicketCycle};
pub use domain::timeline::{CompanyEvent, EventTimeline, HedgeAction};

// Application re-exports
pub use application::ports::{
    EventPublisherPort, MarketDataPort, NoOpEventPublisher, ReconciliationCallback, VenuePort,
};
pub use application::use_cases::{
    CycleTicketsUseCase, PlanHedgeUseCase, ReconcileUseCase,
};

// Infrastructure re-exports
pub use error::{EngineError, ErrorCode};
pub use infrastructure::broker::ClientIdPool;
pub use infrastructure::market_data::SimulatedMarketData;
pub use infrastructure::persistence::{
    InMemoryEventTimeline, InMemoryReconciliationStore, InMemoryTicketRepository,
};
pub use infrastructure::venue::SimulatedVenue;
