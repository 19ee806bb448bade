//! Plan Hedge Use Case
//!
//! One hedging cycle for a company: anchor a hedge action on the timeline,
//! net the accounts' desired positions against each other and against the
//! company's exposure pool, and submit one ticket per pair for the residual
//! the venue must absorb.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::application::ports::{EventPublisherPort, HEDGE_UPDATE_TOPIC};
use crate::domain::liquidity::{
    cross_desired_positions, liquidity_adjusted_positions, DesiredPosition, LiquidityData,
    LiquidityPoolRecord,
};
use crate::domain::shared::{AccountId, CompanyId, FxPair, Timestamp};
use crate::domain::tickets::{OrderTicket, TicketRepository};
use crate::domain::timeline::{EventTimeline, TimelineError};

/// Inputs for one hedging cycle.
#[derive(Debug)]
pub struct HedgePlanRequest {
    /// Company being hedged.
    pub company: CompanyId,
    /// Cycle reference time.
    pub time: Timestamp,
    /// Per-pair per-account cash exposures.
    pub account_exposures: HashMap<FxPair, HashMap<AccountId, Decimal>>,
    /// Per-pair per-account raw desired positions.
    pub desired_positions: HashMap<FxPair, HashMap<AccountId, Decimal>>,
    /// Current company positions per pair.
    pub company_positions: HashMap<FxPair, Decimal>,
}

/// Outcome of one hedging cycle.
#[derive(Debug)]
pub struct HedgePlan {
    /// Hedge action anchoring the cycle.
    pub hedge_action_id: crate::domain::shared::HedgeActionId,
    /// Final (post-netting) desired positions, with originals retained.
    pub desired_positions: Vec<DesiredPosition>,
    /// Pool records written for this cycle.
    pub pool_records: Vec<LiquidityPoolRecord>,
    /// Tickets created for residual demand.
    pub tickets: Vec<OrderTicket>,
    /// Per-pair problems that did not abort the cycle.
    pub errors: Vec<String>,
}

/// Use case for planning and submitting one company hedge cycle.
pub struct PlanHedgeUseCase<T, R, P>
where
    T: EventTimeline,
    R: TicketRepository,
    P: EventPublisherPort,
{
    timeline: Arc<T>,
    tickets: Arc<R>,
    publisher: Arc<P>,
}

impl<T, R, P> PlanHedgeUseCase<T, R, P>
where
    T: EventTimeline,
    R: TicketRepository,
    P: EventPublisherPort,
{
    /// Create a new `PlanHedgeUseCase`.
    pub fn new(timeline: Arc<T>, tickets: Arc<R>, publisher: Arc<P>) -> Self {
        Self {
            timeline,
            tickets,
            publisher,
        }
    }

    /// Run one hedging cycle.
    ///
    /// Per-pair failures are collected and skipped; a pair with no pool
    /// backing is treated as zero exposure rather than aborting the cycle.
    ///
    /// # Errors
    ///
    /// Returns error only if the timeline cannot anchor the cycle.
    pub async fn execute(&self, request: HedgePlanRequest) -> Result<HedgePlan, TimelineError> {
        let hedge_action = self
            .timeline
            .create_hedge_action(&request.company, request.time)
            .await?;
        info!(company = %request.company, action = %hedge_action.id(), "planning hedge cycle");

        let mut plan = HedgePlan {
            hedge_action_id: hedge_action.id().clone(),
            desired_positions: Vec::new(),
            pool_records: Vec::new(),
            tickets: Vec::new(),
            errors: Vec::new(),
        };

        for (fx_pair, raw_desired) in &request.desired_positions {
            let empty = HashMap::new();
            let exposures = request.account_exposures.get(fx_pair).unwrap_or(&empty);
            let total_exposure: Decimal = exposures.values().sum();
            let pool = LiquidityPoolRecord::new(
                fx_pair.clone(),
                hedge_action.id().clone(),
                total_exposure,
            );

            // Net opposing accounts against each other first, then let the
            // pool absorb what the company's own exposure already covers.
            // With no pool exposure there is nothing to absorb against.
            let crossed = cross_desired_positions(raw_desired);
            let net_after_cross: Decimal = crossed.values().sum();
            let absorption = net_after_cross + total_exposure;
            let adjusted = if total_exposure.is_zero() || absorption.is_zero() {
                crossed
            } else {
                liquidity_adjusted_positions(exposures, &crossed, absorption)
            };

            let mut positions = Vec::with_capacity(raw_desired.len());
            for (account, raw_amount) in raw_desired {
                let mut position = DesiredPosition::new(
                    account.clone(),
                    fx_pair.clone(),
                    hedge_action.id().clone(),
                    *raw_amount,
                );
                if let Some(adjusted_amount) = adjusted.get(account) {
                    position.apply_netting(*adjusted_amount);
                }
                positions.push(position);
            }

            let data = LiquidityData::new(fx_pair.clone(), Some(&pool), positions.clone());
            debug!(
                pair = %fx_pair,
                net_desired = %data.net_desired_position(),
                liquidity_change = %data.liquidity_change(),
                pool_size = %data.pool_size(),
                "netted pair"
            );

            // Only the residual between what the accounts now want and what
            // the company already holds goes to the venue.
            let current = request
                .company_positions
                .get(fx_pair)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let residual = data.net_desired_position() - current;
            if !residual.is_zero() {
                let ticket = OrderTicket::new(
                    request.company.clone(),
                    fx_pair.clone(),
                    hedge_action.id().clone(),
                    residual,
                    request.time,
                );
                if let Err(e) = self.tickets.save(&ticket).await {
                    warn!(pair = %fx_pair, error = %e, "failed to save ticket, skipping pair");
                    plan.errors.push(format!("{fx_pair}: {e}"));
                    continue;
                }
                plan.tickets.push(ticket);
            }

            plan.pool_records.push(pool);
            plan.desired_positions.extend(positions);
        }

        let payload = json!({
            "company": request.company.as_str(),
            "hedge_action": plan.hedge_action_id.as_str(),
            "tickets": plan.tickets.len(),
        });
        if let Err(e) = self.publisher.publish(HEDGE_UPDATE_TOPIC, payload).await {
            // Publishing is fire-and-forget; the cycle still stands.
            warn!(error = %e, "failed to publish hedge update");
        }

        Ok(plan)
    }
}
