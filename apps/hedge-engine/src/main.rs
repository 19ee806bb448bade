//! Hedge Engine Binary
//!
//! Starts the hedge engine with simulated collaborators and periodic sweeps.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin hedge-engine
//! ```
//!
//! # Environment Variables
//!
//! - `HEDGE_CONFIG`: Path to the YAML config file (default: config.yaml,
//!   falling back to built-in defaults when the file is absent)
//! - `RUST_LOG`: Log filter (overrides the configured level)

use std::sync::Arc;
use std::time::Duration;

use hedge_engine::application::use_cases::{
    collect_venue_inputs, CycleTicketsUseCase, ReconcileUseCase,
};
use hedge_engine::config::{Config, load_config};
use hedge_engine::domain::shared::Timestamp;
use hedge_engine::infrastructure::broker::ClientIdPool;
use hedge_engine::infrastructure::market_data::SimulatedMarketData;
use hedge_engine::infrastructure::persistence::{
    InMemoryEventTimeline, InMemoryReconciliationStore, InMemoryTicketRepository,
};
use hedge_engine::infrastructure::venue::SimulatedVenue;
use hedge_engine::observability::init_logging;
use tokio::signal;

type ConcreteCycleTickets =
    CycleTicketsUseCase<InMemoryTicketRepository, SimulatedMarketData, SimulatedVenue>;
type ConcreteReconcile = ReconcileUseCase<InMemoryReconciliationStore<InMemoryEventTimeline>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_engine_config();
    init_logging(&config.logging)?;

    tracing::info!("Starting hedge engine");
    log_config(&config);

    let timeline = Arc::new(InMemoryEventTimeline::new());
    let tickets = Arc::new(InMemoryTicketRepository::new());
    let market_data = Arc::new(SimulatedMarketData::new());
    let venue = Arc::new(SimulatedVenue::new());
    let store = Arc::new(InMemoryReconciliationStore::new(Arc::clone(&timeline)));

    let client_ids = Arc::new(ClientIdPool::new(
        config.broker.client_id_min,
        config.broker.client_id_max,
    ));
    let session_id = client_ids
        .acquire_with_retry(
            config.broker.acquire_max_attempts,
            Duration::from_millis(config.broker.acquire_base_delay_ms),
        )
        .await?;
    tracing::info!(client_id = session_id, "broker session id leased");

    let cycle = Arc::new(CycleTicketsUseCase::new(
        Arc::clone(&tickets),
        Arc::clone(&market_data),
        Arc::clone(&venue),
    ));
    let reconcile = Arc::new(ReconcileUseCase::new(store));

    let cycle_handle = spawn_cycle_sweep(Arc::clone(&cycle), &config);
    let reconcile_handle = spawn_reconcile_sweep(reconcile, tickets, venue, market_data, &config);

    tracing::info!("Hedge engine ready");

    signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    cycle_handle.abort();
    reconcile_handle.abort();
    client_ids.release(session_id);

    tracing::info!("Hedge engine stopped");
    Ok(())
}

/// Load configuration, falling back to defaults when no file exists.
fn load_engine_config() -> Config {
    let path = std::env::var("HEDGE_CONFIG").ok();
    match load_config(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config not loaded ({e}), using defaults");
            Config::default()
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &Config) {
    tracing::info!(
        cycle_interval_secs = config.sweeps.cycle_interval_secs,
        reconcile_interval_secs = config.sweeps.reconcile_interval_secs,
        client_id_min = config.broker.client_id_min,
        client_id_max = config.broker.client_id_max,
        "Configuration loaded"
    );
}

/// Run the reconciliation pass on its configured interval: roll venue
/// fills on open tickets up into per-company inputs and reconcile each
/// company.
fn spawn_reconcile_sweep(
    reconcile: Arc<ConcreteReconcile>,
    tickets: Arc<InMemoryTicketRepository>,
    venue: Arc<SimulatedVenue>,
    market_data: Arc<SimulatedMarketData>,
    config: &Config,
) -> tokio::task::JoinHandle<()> {
    let interval = Duration::from_secs(config.sweeps.reconcile_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let now = Timestamp::now();
            let by_company =
                collect_venue_inputs(&*tickets, &*venue, &*market_data, now).await;
            for (company, inputs) in by_company {
                match reconcile.execute(&company, now, inputs, true).await {
                    Ok(outcome) => tracing::info!(
                        company = %company,
                        pairs = outcome.data.len(),
                        results = outcome.results.len(),
                        "reconciliation pass finished"
                    ),
                    Err(e) => tracing::warn!(
                        company = %company,
                        error = %e,
                        "reconciliation pass failed"
                    ),
                }
            }
        }
    })
}

/// Run the ticket driver on its configured interval.
fn spawn_cycle_sweep(cycle: Arc<ConcreteCycleTickets>, config: &Config) -> tokio::task::JoinHandle<()> {
    let interval = Duration::from_secs(config.sweeps.cycle_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let report = cycle.execute(Timestamp::now()).await;
            if report.visited > 0 {
                tracing::info!(
                    visited = report.visited,
                    transitioned = report.transitioned,
                    submitted = report.submitted,
                    expired = report.expired,
                    errors = report.errors.len(),
                    "ticket sweep finished"
                );
            }
        }
    })
}
