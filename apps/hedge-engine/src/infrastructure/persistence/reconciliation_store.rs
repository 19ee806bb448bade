//! Timeline-backed reconciliation store.
//!
//! Implements the reconciliation callback against the in-process stores:
//! events are anchored through the timeline, per-account position history
//! goes into the snapshot chains, and records and hedge results are held in
//! memory. Suitable for testing and development. Not for production use.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{CallbackError, ReconciliationCallback};
use crate::domain::positions::{FxPosition, PositionSnapshot, SnapshotChainStore};
use crate::domain::reconciliation::{
    AccountHedgeResult, HedgeResultStatus, ReconciliationData, ReconciliationRecord,
};
use crate::domain::shared::{AccountId, CompanyId, FxPair, SnapshotId, Timestamp};
use crate::domain::timeline::{CompanyEvent, EventTimeline, SnapshotKind, TimelineError};

impl From<TimelineError> for CallbackError {
    fn from(err: TimelineError) -> Self {
        match err {
            TimelineError::EventNotFound { event_id } => Self::NotFound {
                entity: format!("event {event_id}"),
            },
            other => Self::Storage {
                message: other.to_string(),
            },
        }
    }
}

/// Reconciliation callback over in-memory stores and an event timeline.
#[derive(Debug)]
pub struct InMemoryReconciliationStore<T>
where
    T: EventTimeline,
{
    timeline: Arc<T>,
    records: RwLock<Vec<ReconciliationRecord>>,
    chains: RwLock<HashMap<AccountId, SnapshotChainStore>>,
    tails: RwLock<HashMap<AccountId, SnapshotId>>,
    company_positions: RwLock<Vec<(CompanyId, Timestamp, HashMap<FxPair, Decimal>)>>,
    hedge_results: RwLock<Vec<(AccountHedgeResult, HedgeResultStatus)>>,
}

impl<T> InMemoryReconciliationStore<T>
where
    T: EventTimeline,
{
    /// Create a new store anchored to the given timeline.
    #[must_use]
    pub fn new(timeline: Arc<T>) -> Self {
        Self {
            timeline,
            records: RwLock::new(Vec::new()),
            chains: RwLock::new(HashMap::new()),
            tails: RwLock::new(HashMap::new()),
            company_positions: RwLock::new(Vec::new()),
            hedge_results: RwLock::new(Vec::new()),
        }
    }

    /// All reconciliation records written so far.
    #[must_use]
    pub fn records(&self) -> Vec<ReconciliationRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All hedge result updates written so far.
    #[must_use]
    pub fn hedge_results(&self) -> Vec<(AccountHedgeResult, HedgeResultStatus)> {
        self.hedge_results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of snapshots in an account's position history.
    #[must_use]
    pub fn snapshot_count(&self, account: &AccountId) -> usize {
        self.chains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account)
            .map_or(0, SnapshotChainStore::len)
    }

    /// The account's positions as of its newest snapshot.
    #[must_use]
    pub fn latest_positions(&self, account: &AccountId) -> Option<Vec<FxPosition>> {
        let tails = self.tails.read().unwrap_or_else(PoisonError::into_inner);
        let tail = tails.get(account)?;
        let chains = self.chains.read().unwrap_or_else(PoisonError::into_inner);
        chains
            .get(account)
            .and_then(|chain| chain.get(tail))
            .map(|snapshot| snapshot.positions().to_vec())
    }
}

#[async_trait]
impl<T> ReconciliationCallback for InMemoryReconciliationStore<T>
where
    T: EventTimeline,
{
    async fn create_company_positions(
        &self,
        company: &CompanyId,
        time: Timestamp,
        reference_prices: &HashMap<FxPair, Decimal>,
    ) -> Result<CompanyEvent, CallbackError> {
        let mut event = self.timeline.get_or_create_event(company, time).await?;
        self.timeline
            .mark_event(event.id(), SnapshotKind::CompanyFx)
            .await?;
        event.mark(SnapshotKind::CompanyFx);
        self.company_positions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((company.clone(), time, reference_prices.clone()));
        Ok(event)
    }

    async fn create_reconciliation_records(
        &self,
        company: &CompanyId,
        time: Timestamp,
        per_pair_data: &[ReconciliationData],
        is_live: bool,
    ) -> Result<(), CallbackError> {
        let event = self.timeline.get_or_create_event(company, time).await?;
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        for data in per_pair_data {
            records.push(ReconciliationRecord::from_data(
                event.id().clone(),
                company.clone(),
                data,
                is_live,
            ));
        }
        Ok(())
    }

    async fn create_fx_positions(
        &self,
        final_positions: &HashMap<FxPair, HashMap<AccountId, FxPosition>>,
        event: &CompanyEvent,
    ) -> Result<(), CallbackError> {
        self.timeline
            .mark_event(event.id(), SnapshotKind::AccountFx)
            .await?;

        let mut by_account: HashMap<AccountId, Vec<FxPosition>> = HashMap::new();
        for accounts in final_positions.values() {
            for (account, position) in accounts {
                by_account
                    .entry(account.clone())
                    .or_default()
                    .push(position.clone());
            }
        }

        let mut chains = self.chains.write().unwrap_or_else(PoisonError::into_inner);
        let mut tails = self.tails.write().unwrap_or_else(PoisonError::into_inner);
        for (account, positions) in by_account {
            let snapshot = PositionSnapshot::new(account.clone(), event.time(), positions);
            let id = snapshot.id().clone();
            let chain = chains.entry(account.clone()).or_default();
            chain
                .append(snapshot, tails.get(&account))
                .map_err(|e| CallbackError::Storage {
                    message: e.to_string(),
                })?;
            tails.insert(account, id);
        }
        Ok(())
    }

    async fn update_hedge_result(
        &self,
        result: &AccountHedgeResult,
        status: HedgeResultStatus,
    ) -> Result<(), CallbackError> {
        self.hedge_results
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((result.clone(), status));
        Ok(())
    }
}
