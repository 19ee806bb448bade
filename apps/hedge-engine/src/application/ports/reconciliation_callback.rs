//! Reconciliation Callback Port (Driven Port)
//!
//! The four operations the reconciliation pass invokes to persist and
//! publish its outcome. Keeping them behind a port leaves the algorithm
//! independent of storage, and substitutable with test doubles.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::positions::FxPosition;
use crate::domain::reconciliation::{
    AccountHedgeResult, HedgeResultStatus, ReconciliationData,
};
use crate::domain::shared::{AccountId, CompanyId, FxPair, Timestamp};
use crate::domain::timeline::CompanyEvent;

/// Reconciliation persistence error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CallbackError {
    /// A referenced entity is missing.
    #[error("Not found: {entity}")]
    NotFound {
        /// Description of the missing entity.
        entity: String,
    },

    /// Underlying storage failed.
    #[error("Reconciliation storage error: {message}")]
    Storage {
        /// Error details.
        message: String,
    },
}

/// Callback interface invoked by the reconciliation pass.
#[async_trait]
pub trait ReconciliationCallback: Send + Sync {
    /// Materialize (or fetch) the event anchoring this pass and record the
    /// company-level positions against it.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn create_company_positions(
        &self,
        company: &CompanyId,
        time: Timestamp,
        reference_prices: &HashMap<FxPair, Decimal>,
    ) -> Result<CompanyEvent, CallbackError>;

    /// Persist the per-pair audit data computed by the pass.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn create_reconciliation_records(
        &self,
        company: &CompanyId,
        time: Timestamp,
        per_pair_data: &[ReconciliationData],
        is_live: bool,
    ) -> Result<(), CallbackError>;

    /// Persist final per-account positions tied to the event.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn create_fx_positions(
        &self,
        final_positions: &HashMap<FxPair, HashMap<AccountId, FxPosition>>,
        event: &CompanyEvent,
    ) -> Result<(), CallbackError>;

    /// Mark the originating hedge request with its reconciled result.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn update_hedge_result(
        &self,
        result: &AccountHedgeResult,
        status: HedgeResultStatus,
    ) -> Result<(), CallbackError>;
}
