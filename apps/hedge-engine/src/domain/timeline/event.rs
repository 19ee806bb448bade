//! Company timeline events.
//!
//! An event is an immutable, time-stamped anchor point on a company's
//! timeline. Position snapshots, hedge actions, and reconciliation records
//! all reference an event so that related rows share one reference time.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{CompanyId, EventId, Timestamp};

/// The kinds of snapshot that can be anchored to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotKind {
    /// A hedge action (one hedging cycle) references this event.
    HedgeAction,
    /// Per-account FX position snapshots reference this event.
    AccountFx,
    /// Company-level FX position snapshots reference this event.
    CompanyFx,
}

/// A point on a company's timeline.
///
/// Events are uniquely keyed by (company, time); ties between events created
/// at the same timestamp are broken by insertion order (`seq`). The snapshot
/// flags are monotonic: once set they are never reset by this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyEvent {
    id: EventId,
    company: CompanyId,
    time: Timestamp,
    seq: u64,
    has_hedge_action: bool,
    has_account_fx_snapshot: bool,
    has_company_fx_snapshot: bool,
}

impl CompanyEvent {
    /// Create a new event with all snapshot flags unset.
    ///
    /// `seq` is the timeline's insertion sequence number, used to order
    /// events that share a timestamp (a reconciliation snapshot and the
    /// hedge submission that follows it commonly share a reference time).
    #[must_use]
    pub fn new(company: CompanyId, time: Timestamp, seq: u64) -> Self {
        Self {
            id: EventId::generate(),
            company,
            time,
            seq,
            has_hedge_action: false,
            has_account_fx_snapshot: false,
            has_company_fx_snapshot: false,
        }
    }

    /// Get the event ID.
    #[must_use]
    pub const fn id(&self) -> &EventId {
        &self.id
    }

    /// Get the owning company.
    #[must_use]
    pub const fn company(&self) -> &CompanyId {
        &self.company
    }

    /// Get the reference time of the event.
    #[must_use]
    pub const fn time(&self) -> Timestamp {
        self.time
    }

    /// Get the insertion sequence number.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Whether a hedge action is anchored at this event.
    #[must_use]
    pub const fn has_hedge_action(&self) -> bool {
        self.has_hedge_action
    }

    /// Whether per-account FX snapshots are anchored at this event.
    #[must_use]
    pub const fn has_account_fx_snapshot(&self) -> bool {
        self.has_account_fx_snapshot
    }

    /// Whether company-level FX snapshots are anchored at this event.
    #[must_use]
    pub const fn has_company_fx_snapshot(&self) -> bool {
        self.has_company_fx_snapshot
    }

    /// Check a snapshot flag by kind.
    #[must_use]
    pub const fn has(&self, kind: SnapshotKind) -> bool {
        match kind {
            SnapshotKind::HedgeAction => self.has_hedge_action,
            SnapshotKind::AccountFx => self.has_account_fx_snapshot,
            SnapshotKind::CompanyFx => self.has_company_fx_snapshot,
        }
    }

    /// Set a snapshot flag. Flags only ever go false → true.
    pub fn mark(&mut self, kind: SnapshotKind) {
        match kind {
            SnapshotKind::HedgeAction => self.has_hedge_action = true,
            SnapshotKind::AccountFx => self.has_account_fx_snapshot = true,
            SnapshotKind::CompanyFx => self.has_company_fx_snapshot = true,
        }
    }

    /// Total order for events of one company: by time, then insertion order.
    #[must_use]
    pub fn timeline_key(&self) -> (Timestamp, u64) {
        (self.time, self.seq)
    }
}
