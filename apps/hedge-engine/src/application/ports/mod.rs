//! Application Ports
//!
//! Driven-port interfaces the engine depends on, implemented by adapters in
//! the infrastructure layer (or test doubles).

pub mod event_publisher_port;
pub mod market_data_port;
pub mod reconciliation_callback;
pub mod venue_port;

pub use event_publisher_port::{
    EventPublishError, EventPublisherPort, NoOpEventPublisher, HEDGE_UPDATE_TOPIC,
};
pub use market_data_port::{MarketDataError, MarketDataPort};
pub use reconciliation_callback::{CallbackError, ReconciliationCallback};
pub use venue_port::{VenueError, VenuePort};
