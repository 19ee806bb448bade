//! Position snapshot chain.
//!
//! Each account's position history is a doubly-linked chain of snapshots
//! held in an arena keyed by id. The chain supports in-place repair: a bad
//! snapshot can be recomputed and swapped without disturbing its neighbors.
//!
//! The replace operation decouples the old node before deleting it. The
//! links are ownership edges, so deleting a still-linked node would cascade
//! through the rest of the chain.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::PositionError;
use super::fx_position::FxPosition;
use crate::domain::shared::{AccountId, SnapshotId, Timestamp};

/// One node in an account's position history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    id: SnapshotId,
    account: AccountId,
    time: Timestamp,
    positions: Vec<FxPosition>,
    last: Option<SnapshotId>,
    next: Option<SnapshotId>,
}

impl PositionSnapshot {
    /// Create an unlinked snapshot.
    #[must_use]
    pub fn new(account: AccountId, time: Timestamp, positions: Vec<FxPosition>) -> Self {
        Self {
            id: SnapshotId::generate(),
            account,
            time,
            positions,
            last: None,
            next: None,
        }
    }

    /// Get the snapshot ID.
    #[must_use]
    pub const fn id(&self) -> &SnapshotId {
        &self.id
    }

    /// Get the owning account.
    #[must_use]
    pub const fn account(&self) -> &AccountId {
        &self.account
    }

    /// Get the snapshot time.
    #[must_use]
    pub const fn time(&self) -> Timestamp {
        self.time
    }

    /// Get the positions captured by this snapshot.
    #[must_use]
    pub fn positions(&self) -> &[FxPosition] {
        &self.positions
    }

    /// Get the previous snapshot's ID, if linked.
    #[must_use]
    pub const fn last(&self) -> Option<&SnapshotId> {
        self.last.as_ref()
    }

    /// Get the following snapshot's ID, if linked.
    #[must_use]
    pub const fn next(&self) -> Option<&SnapshotId> {
        self.next.as_ref()
    }

    /// Set both links at once.
    pub fn link(&mut self, last: Option<SnapshotId>, next: Option<SnapshotId>) {
        self.last = last;
        self.next = next;
    }
}

/// Arena-style store for snapshot chains.
#[derive(Debug, Default)]
pub struct SnapshotChainStore {
    snapshots: HashMap<SnapshotId, PositionSnapshot>,
}

impl SnapshotChainStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get a snapshot by ID.
    #[must_use]
    pub fn get(&self, id: &SnapshotId) -> Option<&PositionSnapshot> {
        self.snapshots.get(id)
    }

    /// Insert a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the ID is taken or the snapshot links to itself.
    pub fn insert(&mut self, snapshot: PositionSnapshot) -> Result<(), PositionError> {
        if snapshot.last() == Some(snapshot.id()) || snapshot.next() == Some(snapshot.id()) {
            return Err(PositionError::SelfLink {
                snapshot_id: snapshot.id().to_string(),
            });
        }
        if self.snapshots.contains_key(snapshot.id()) {
            return Err(PositionError::DuplicateSnapshot {
                snapshot_id: snapshot.id().to_string(),
            });
        }
        self.snapshots.insert(snapshot.id().clone(), snapshot);
        Ok(())
    }

    /// Append a snapshot to the tail of an account's chain, linking it to
    /// the current tail.
    ///
    /// # Errors
    ///
    /// Returns error if the ID is taken.
    pub fn append(
        &mut self,
        mut snapshot: PositionSnapshot,
        tail: Option<&SnapshotId>,
    ) -> Result<(), PositionError> {
        snapshot.link(tail.cloned(), None);
        let id = snapshot.id().clone();
        self.insert(snapshot)?;
        if let Some(tail_id) = tail {
            if let Some(prev) = self.snapshots.get_mut(tail_id) {
                prev.next = Some(id);
            }
        }
        Ok(())
    }

    /// Replace a snapshot with a recomputed one, as one all-or-nothing unit:
    ///
    /// 1. Read the old node's links, tolerating absent neighbors.
    /// 2. Null the old node's links, then delete it. Deleting first would
    ///    cascade through the link edges and destroy the whole chain.
    /// 3. Point the neighbors away from the deleted node.
    /// 4. Insert the new node.
    /// 5. If the new node carries links of its own, point those neighbors
    ///    back at it.
    ///
    /// All validation happens before the first mutation, so a failure leaves
    /// the store untouched.
    ///
    /// # Errors
    ///
    /// Returns error if the old snapshot is missing, the new one's ID
    /// collides with another node, or the new one links to itself.
    pub fn replace_snapshot(
        &mut self,
        old_id: &SnapshotId,
        new_snapshot: PositionSnapshot,
    ) -> Result<(), PositionError> {
        if !self.snapshots.contains_key(old_id) {
            return Err(PositionError::SnapshotNotFound {
                snapshot_id: old_id.to_string(),
            });
        }
        if new_snapshot.last() == Some(new_snapshot.id())
            || new_snapshot.next() == Some(new_snapshot.id())
        {
            return Err(PositionError::SelfLink {
                snapshot_id: new_snapshot.id().to_string(),
            });
        }
        if new_snapshot.id() != old_id && self.snapshots.contains_key(new_snapshot.id()) {
            return Err(PositionError::DuplicateSnapshot {
                snapshot_id: new_snapshot.id().to_string(),
            });
        }

        // Step 1: capture the old links.
        let (old_last, old_next) = {
            let old = &self.snapshots[old_id];
            (old.last.clone(), old.next.clone())
        };

        // Step 2: decouple, then delete.
        if let Some(old) = self.snapshots.get_mut(old_id) {
            old.last = None;
            old.next = None;
        }
        self.snapshots.remove(old_id);

        // Step 3: point the neighbors away from the deleted node.
        if let Some(last_id) = &old_last {
            if let Some(last) = self.snapshots.get_mut(last_id) {
                last.next = None;
            }
        }
        if let Some(next_id) = &old_next {
            if let Some(next) = self.snapshots.get_mut(next_id) {
                next.last = None;
            }
        }

        // Steps 4 and 5: insert and re-link.
        let new_id = new_snapshot.id().clone();
        self.snapshots.insert(new_id.clone(), new_snapshot);
        self.relink_snapshot(&new_id)?;
        Ok(())
    }

    /// Point a snapshot's neighbors back at it, per its own `last`/`next`
    /// links. Missing neighbors are tolerated.
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot itself is missing.
    pub fn relink_snapshot(&mut self, id: &SnapshotId) -> Result<(), PositionError> {
        let (last, next) = {
            let snapshot =
                self.snapshots
                    .get(id)
                    .ok_or_else(|| PositionError::SnapshotNotFound {
                        snapshot_id: id.to_string(),
                    })?;
            (snapshot.last.clone(), snapshot.next.clone())
        };

        if let Some(last_id) = last {
            if let Some(node) = self.snapshots.get_mut(&last_id) {
                node.next = Some(id.clone());
            }
        }
        if let Some(next_id) = next {
            if let Some(node) = self.snapshots.get_mut(&next_id) {
                node.last = Some(id.clone());
            }
        }
        Ok(())
    }

    /// Walk the chain forward from a snapshot, returning the visited IDs in
    /// order. Stops if a link cycles back to a visited node.
    #[must_use]
    pub fn walk_forward(&self, from: &SnapshotId) -> Vec<SnapshotId> {
        let mut visited = Vec::new();
        let mut current = Some(from.clone());
        while let Some(id) = current {
            if visited.contains(&id) {
                break;
            }
            let Some(snapshot) = self.snapshots.get(&id) else {
                break;
            };
            visited.push(id);
            current = snapshot.next.clone();
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::FxPair;
    use rust_decimal_macros::dec;

    fn snapshot(time: &str) -> PositionSnapshot {
        PositionSnapshot::new(
            AccountId::new("acct-1"),
            Timestamp::parse(time).unwrap(),
            vec![FxPosition::new(
                AccountId::new("acct-1"),
                FxPair::new("EUR", "USD"),
                dec!(100000),
                dec!(108000),
            )],
        )
    }

    /// Build a three-node chain a <-> b <-> c, returning the store and ids.
    fn three_node_chain() -> (SnapshotChainStore, SnapshotId, SnapshotId, SnapshotId) {
        let mut store = SnapshotChainStore::new();
        let a = snapshot("2024-06-01T22:00:00Z");
        let b = snapshot("2024-06-02T22:00:00Z");
        let c = snapshot("2024-06-03T22:00:00Z");
        let (a_id, b_id, c_id) = (a.id().clone(), b.id().clone(), c.id().clone());
        store.append(a, None).unwrap();
        store.append(b, Some(&a_id)).unwrap();
        store.append(c, Some(&b_id)).unwrap();
        (store, a_id, b_id, c_id)
    }

    #[test]
    fn append_links_both_directions() {
        let (store, a_id, b_id, c_id) = three_node_chain();
        assert_eq!(store.get(&a_id).unwrap().next(), Some(&b_id));
        assert_eq!(store.get(&b_id).unwrap().last(), Some(&a_id));
        assert_eq!(store.get(&b_id).unwrap().next(), Some(&c_id));
        assert_eq!(store.get(&c_id).unwrap().last(), Some(&b_id));
        assert_eq!(store.walk_forward(&a_id), vec![a_id, b_id, c_id]);
    }

    #[test]
    fn replace_middle_node_preserves_neighbors() {
        let (mut store, a_id, b_id, c_id) = three_node_chain();

        let mut replacement = snapshot("2024-06-02T22:00:00Z");
        replacement.link(Some(a_id.clone()), Some(c_id.clone()));
        let new_id = replacement.id().clone();

        store.replace_snapshot(&b_id, replacement).unwrap();

        // The old node is gone, both neighbors survive and point at the new
        // node in both directions.
        assert!(store.get(&b_id).is_none());
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(&a_id).unwrap().next(), Some(&new_id));
        assert_eq!(store.get(&c_id).unwrap().last(), Some(&new_id));
        assert_eq!(store.walk_forward(&a_id), vec![a_id, new_id, c_id]);
    }

    #[test]
    fn replace_head_node() {
        let (mut store, a_id, b_id, c_id) = three_node_chain();

        let mut replacement = snapshot("2024-06-01T22:00:00Z");
        replacement.link(None, Some(b_id.clone()));
        let new_id = replacement.id().clone();

        store.replace_snapshot(&a_id, replacement).unwrap();

        assert!(store.get(&a_id).is_none());
        assert_eq!(store.get(&b_id).unwrap().last(), Some(&new_id));
        assert_eq!(store.walk_forward(&new_id), vec![new_id, b_id, c_id]);
    }

    #[test]
    fn replace_unlinked_replacement_detaches_neighbors() {
        let (mut store, a_id, b_id, _c_id) = three_node_chain();

        // A replacement with no links of its own leaves the neighbors
        // decoupled rather than dangling at the deleted node.
        let replacement = snapshot("2024-06-02T22:00:00Z");
        store.replace_snapshot(&b_id, replacement).unwrap();

        assert_eq!(store.get(&a_id).unwrap().next(), None);
    }

    #[test]
    fn replace_missing_snapshot_leaves_store_untouched() {
        let (mut store, a_id, b_id, c_id) = three_node_chain();
        let ghost = snapshot("2024-06-04T22:00:00Z");
        let ghost_id = ghost.id().clone();

        let err = store.replace_snapshot(&ghost_id, snapshot("2024-06-04T22:00:00Z"));
        assert!(matches!(err, Err(PositionError::SnapshotNotFound { .. })));
        assert_eq!(store.len(), 3);
        assert_eq!(store.walk_forward(&a_id), vec![a_id, b_id, c_id]);
    }

    #[test]
    fn self_linked_replacement_is_rejected() {
        let (mut store, _a_id, b_id, _c_id) = three_node_chain();
        let mut replacement = snapshot("2024-06-02T22:00:00Z");
        let self_id = replacement.id().clone();
        replacement.link(Some(self_id), None);

        let err = store.replace_snapshot(&b_id, replacement);
        assert!(matches!(err, Err(PositionError::SelfLink { .. })));
        assert!(store.get(&b_id).is_some());
    }

    #[test]
    fn walk_forward_stops_on_cycle() {
        let mut store = SnapshotChainStore::new();
        let mut a = snapshot("2024-06-01T22:00:00Z");
        let mut b = snapshot("2024-06-02T22:00:00Z");
        let (a_id, b_id) = (a.id().clone(), b.id().clone());
        a.link(None, Some(b_id.clone()));
        b.link(Some(a_id.clone()), Some(a_id.clone()));
        store.insert(a).unwrap();
        store.insert(b).unwrap();

        assert_eq!(store.walk_forward(&a_id), vec![a_id, b_id]);
    }
}
