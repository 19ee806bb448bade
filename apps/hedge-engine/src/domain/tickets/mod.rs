//! Order Tickets
//!
//! The order-execution intents produced by hedging cycles and the
//! level-triggered state machine that drives them through authorization,
//! funding, scheduling and execution.

pub mod errors;
pub mod machine;
pub mod repository;
pub mod states;
pub mod ticket;

pub use errors::TicketError;
pub use machine::{CycleContext, Effect, TicketCycle, Transition};
pub use repository::TicketRepository;
pub use states::{ExecutionStatus, ExecutionStrategy, FundingModel, InternalState, Phase};
pub use ticket::OrderTicket;
