//! Reconcile Use Case
//!
//! Runs the reconciliation calculator for one company and persists the
//! outcome through the callback port. Passes for the same company are
//! serialized so two passes can never compute conflicting position
//! transitions; different companies reconcile concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::application::ports::{CallbackError, MarketDataPort, ReconciliationCallback, VenuePort};
use crate::domain::reconciliation::{
    HedgeResultStatus, ReconciliationCalculator, ReconciliationInputs, ReconciliationOutcome,
};
use crate::domain::shared::{CompanyId, Timestamp};
use crate::domain::tickets::TicketRepository;

/// Use case reconciling venue truth against recorded positions.
pub struct ReconcileUseCase<C>
where
    C: ReconciliationCallback,
{
    callback: Arc<C>,
    company_locks: Mutex<HashMap<CompanyId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<C> ReconcileUseCase<C>
where
    C: ReconciliationCallback,
{
    /// Create a new `ReconcileUseCase`.
    pub fn new(callback: Arc<C>) -> Self {
        Self {
            callback,
            company_locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, company: &CompanyId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.company_locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(
            locks
                .entry(company.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    /// Reconcile one company at a reference time.
    ///
    /// # Errors
    ///
    /// Returns error if persisting through the callback fails; the
    /// calculation itself never fails.
    pub async fn execute(
        &self,
        company: &CompanyId,
        time: Timestamp,
        inputs: ReconciliationInputs,
        is_live: bool,
    ) -> Result<ReconciliationOutcome, CallbackError> {
        let lock = self.lock_for(company);
        let _guard = lock.lock().await;

        info!(company = %company, %time, is_live, "reconciling company");
        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        let event = self
            .callback
            .create_company_positions(company, time, &inputs.reference_prices)
            .await?;
        self.callback
            .create_reconciliation_records(company, time, &outcome.data, is_live)
            .await?;
        self.callback
            .create_fx_positions(&outcome.final_positions, &event)
            .await?;

        for result in &outcome.results {
            let status = if result.filled_amount().is_zero() {
                HedgeResultStatus::Closed
            } else {
                HedgeResultStatus::Filled
            };
            self.callback.update_hedge_result(result, status).await?;
        }

        if outcome.data.iter().any(|d| !d.unexplained_change().is_zero()) {
            warn!(company = %company, "reconciliation finished with unexplained changes");
        }
        Ok(outcome)
    }
}

/// Build per-company reconciliation inputs from venue-reported fills on
/// open tickets.
///
/// Fills for the same pair are merged (amounts and commissions summed,
/// average price volume-weighted). Per-ticket failures are logged and
/// skipped so one bad order cannot starve the pass.
pub async fn collect_venue_inputs<R, V, M>(
    tickets: &R,
    venue: &V,
    market_data: &M,
    now: Timestamp,
) -> HashMap<CompanyId, ReconciliationInputs>
where
    R: TicketRepository,
    V: VenuePort,
    M: MarketDataPort,
{
    let mut by_company: HashMap<CompanyId, ReconciliationInputs> = HashMap::new();

    let open = match tickets.find_open().await {
        Ok(open) => open,
        Err(e) => {
            warn!(error = %e, "failed to load tickets for reconciliation");
            return by_company;
        }
    };

    for ticket in open {
        let Some(order_id) = ticket.venue_order_id() else {
            continue;
        };
        let fill = match venue.get_fills(order_id).await {
            Ok(Some(fill)) => fill,
            Ok(None) => continue,
            Err(e) => {
                warn!(ticket = %ticket.id(), error = %e, "failed to fetch fills, skipping");
                continue;
            }
        };

        let inputs = by_company.entry(ticket.company().clone()).or_default();
        let pair = ticket.fx_pair().clone();
        *inputs
            .company_positions_after
            .entry(pair.clone())
            .or_default() += fill.amount_filled;
        inputs
            .filled_amounts
            .entry(pair.clone())
            .and_modify(|merged| {
                let total = merged.amount_filled + fill.amount_filled;
                if !total.is_zero() {
                    merged.average_price = (merged.average_price * merged.amount_filled
                        + fill.average_price * fill.amount_filled)
                        / total;
                }
                merged.amount_filled = total;
                merged.commission += fill.commission;
                merged.cntr_commission += fill.cntr_commission;
            })
            .or_insert(fill);

        if let Ok(Some(price)) = market_data.reference_price(ticket.fx_pair(), now).await {
            inputs.reference_prices.insert(pair, price);
        }
    }

    by_company
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MarketDataError, VenueError};
    use crate::domain::positions::FxPosition;
    use crate::domain::reconciliation::{AccountHedgeResult, FxFillSummary, ReconciliationData};
    use crate::domain::shared::{AccountId, FxPair, HedgeActionId, VenueOrderId};
    use crate::domain::tickets::OrderTicket;
    use crate::CompanyEvent;
    use crate::infrastructure::persistence::in_memory::InMemoryTicketRepository;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct RecordingCallback {
        records: Mutex<Vec<(usize, bool)>>,
        positions: Mutex<Vec<usize>>,
        results: Mutex<Vec<(String, HedgeResultStatus)>>,
    }

    #[async_trait]
    impl ReconciliationCallback for RecordingCallback {
        async fn create_company_positions(
            &self,
            company: &CompanyId,
            time: Timestamp,
            _reference_prices: &HashMap<FxPair, Decimal>,
        ) -> Result<CompanyEvent, CallbackError> {
            Ok(CompanyEvent::new(company.clone(), time, 0))
        }

        async fn create_reconciliation_records(
            &self,
            _company: &CompanyId,
            _time: Timestamp,
            per_pair_data: &[ReconciliationData],
            is_live: bool,
        ) -> Result<(), CallbackError> {
            self.records
                .lock()
                .unwrap()
                .push((per_pair_data.len(), is_live));
            Ok(())
        }

        async fn create_fx_positions(
            &self,
            final_positions: &HashMap<FxPair, HashMap<AccountId, FxPosition>>,
            _event: &CompanyEvent,
        ) -> Result<(), CallbackError> {
            self.positions.lock().unwrap().push(final_positions.len());
            Ok(())
        }

        async fn update_hedge_result(
            &self,
            result: &AccountHedgeResult,
            status: HedgeResultStatus,
        ) -> Result<(), CallbackError> {
            self.results
                .lock()
                .unwrap()
                .push((result.account().to_string(), status));
            Ok(())
        }
    }

    fn pair() -> FxPair {
        FxPair::new("EUR", "USD")
    }

    fn time() -> Timestamp {
        Timestamp::parse("2024-06-03T22:00:00Z").unwrap()
    }

    #[tokio::test]
    async fn callbacks_fire_in_order_with_outcome_data() {
        let callback = Arc::new(RecordingCallback::default());
        let uc = ReconcileUseCase::new(Arc::clone(&callback));

        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_after.insert(pair(), dec!(1000));
        inputs.account_desired_positions.insert(
            pair(),
            HashMap::from([(AccountId::new("a"), dec!(1000))]),
        );
        inputs.account_hedge_requests.insert(
            pair(),
            vec![crate::domain::reconciliation::AccountHedgeRequest::new(
                AccountId::new("a"),
                pair(),
                crate::domain::shared::HedgeActionId::new("ha-1"),
                dec!(1000),
            )],
        );
        inputs
            .filled_amounts
            .insert(pair(), FxFillSummary::new(dec!(1000), dec!(5), dec!(5), dec!(1.08)));

        let outcome = uc
            .execute(&CompanyId::new("co-1"), time(), inputs, true)
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(*callback.records.lock().unwrap(), vec![(1, true)]);
        assert_eq!(*callback.positions.lock().unwrap(), vec![1]);
        assert_eq!(
            *callback.results.lock().unwrap(),
            vec![("a".to_owned(), HedgeResultStatus::Filled)]
        );
    }

    #[tokio::test]
    async fn unfilled_requests_are_closed_not_filled() {
        let callback = Arc::new(RecordingCallback::default());
        let uc = ReconcileUseCase::new(Arc::clone(&callback));

        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_before.insert(pair(), dec!(1000));
        inputs.company_positions_after.insert(pair(), dec!(1000));
        inputs.account_desired_positions.insert(
            pair(),
            HashMap::from([(AccountId::new("a"), dec!(1000))]),
        );
        inputs.initial_account_positions.insert(
            pair(),
            HashMap::from([(
                AccountId::new("a"),
                FxPosition::new(AccountId::new("a"), pair(), dec!(1000), dec!(1080)),
            )]),
        );
        inputs.account_hedge_requests.insert(
            pair(),
            vec![crate::domain::reconciliation::AccountHedgeRequest::new(
                AccountId::new("a"),
                pair(),
                crate::domain::shared::HedgeActionId::new("ha-1"),
                dec!(0),
            )],
        );
        inputs.reference_prices.insert(pair(), dec!(1.08));

        uc.execute(&CompanyId::new("co-1"), time(), inputs, false)
            .await
            .unwrap();

        assert_eq!(
            *callback.results.lock().unwrap(),
            vec![("a".to_owned(), HedgeResultStatus::Closed)]
        );
    }

    struct FillingVenue {
        fills: HashMap<VenueOrderId, FxFillSummary>,
    }

    #[async_trait]
    impl VenuePort for FillingVenue {
        async fn submit(&self, _ticket: &OrderTicket) -> Result<VenueOrderId, VenueError> {
            Ok(VenueOrderId::new("vo-x"))
        }

        async fn cancel(&self, _order_id: &VenueOrderId) -> Result<(), VenueError> {
            Ok(())
        }

        async fn get_fills(
            &self,
            order_id: &VenueOrderId,
        ) -> Result<Option<FxFillSummary>, VenueError> {
            Ok(self.fills.get(order_id).copied())
        }
    }

    struct QuotingMarketData(Option<Decimal>);

    #[async_trait]
    impl MarketDataPort for QuotingMarketData {
        async fn is_market_open(
            &self,
            _pair: &FxPair,
            _time: Timestamp,
        ) -> Result<bool, MarketDataError> {
            Ok(true)
        }

        async fn reference_price(
            &self,
            _pair: &FxPair,
            _time: Timestamp,
        ) -> Result<Option<Decimal>, MarketDataError> {
            Ok(self.0)
        }
    }

    fn working_ticket(company: &str, order: &str, amount: Decimal) -> OrderTicket {
        let mut ticket = OrderTicket::new(
            CompanyId::new(company),
            pair(),
            HedgeActionId::new("ha-1"),
            amount,
            time(),
        );
        ticket.set_venue_order_id(VenueOrderId::new(order));
        ticket
    }

    #[tokio::test]
    async fn venue_fills_roll_up_into_company_inputs() {
        let repo = InMemoryTicketRepository::new();
        repo.save(&working_ticket("co-1", "vo-1", dec!(600000)))
            .await
            .unwrap();
        // Never submitted; must not contribute.
        let unsubmitted = OrderTicket::new(
            CompanyId::new("co-2"),
            pair(),
            HedgeActionId::new("ha-2"),
            dec!(100),
            time(),
        );
        repo.save(&unsubmitted).await.unwrap();

        let venue = FillingVenue {
            fills: HashMap::from([(
                VenueOrderId::new("vo-1"),
                FxFillSummary::new(dec!(600000), dec!(5), dec!(5), dec!(1.0850)),
            )]),
        };
        let market_data = QuotingMarketData(Some(dec!(1.0850)));

        let by_company = collect_venue_inputs(&repo, &venue, &market_data, time()).await;

        assert_eq!(by_company.len(), 1);
        let inputs = &by_company[&CompanyId::new("co-1")];
        assert_eq!(inputs.company_positions_after[&pair()], dec!(600000));
        assert_eq!(inputs.filled_amounts[&pair()].amount_filled, dec!(600000));
        assert_eq!(inputs.reference_prices[&pair()], dec!(1.0850));
    }

    #[tokio::test]
    async fn fills_for_the_same_pair_merge_volume_weighted() {
        let repo = InMemoryTicketRepository::new();
        repo.save(&working_ticket("co-1", "vo-1", dec!(600000)))
            .await
            .unwrap();
        repo.save(&working_ticket("co-1", "vo-2", dec!(200000)))
            .await
            .unwrap();

        let venue = FillingVenue {
            fills: HashMap::from([
                (
                    VenueOrderId::new("vo-1"),
                    FxFillSummary::new(dec!(600000), dec!(6), dec!(6), dec!(1.08)),
                ),
                (
                    VenueOrderId::new("vo-2"),
                    FxFillSummary::new(dec!(200000), dec!(2), dec!(2), dec!(1.10)),
                ),
            ]),
        };
        let market_data = QuotingMarketData(None);

        let by_company = collect_venue_inputs(&repo, &venue, &market_data, time()).await;

        let merged = by_company[&CompanyId::new("co-1")].filled_amounts[&pair()];
        assert_eq!(merged.amount_filled, dec!(800000));
        assert_eq!(merged.commission, dec!(8));
        assert_eq!(merged.average_price, dec!(1.085));
        assert_eq!(
            by_company[&CompanyId::new("co-1")].company_positions_after[&pair()],
            dec!(800000)
        );
    }

    #[tokio::test]
    async fn concurrent_passes_for_one_company_serialize() {
        let callback = Arc::new(RecordingCallback::default());
        let uc = Arc::new(ReconcileUseCase::new(Arc::clone(&callback)));
        let company = CompanyId::new("co-1");

        let mut handles = Vec::new();
        for _ in 0..4 {
            let uc = Arc::clone(&uc);
            let company = company.clone();
            handles.push(tokio::spawn(async move {
                uc.execute(&company, time(), ReconciliationInputs::default(), true)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(callback.records.lock().unwrap().len(), 4);
    }
}
