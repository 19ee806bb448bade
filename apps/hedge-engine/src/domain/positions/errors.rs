//! Position errors.

use std::fmt;

/// Errors raised by the snapshot chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// Snapshot not found.
    SnapshotNotFound {
        /// Snapshot ID.
        snapshot_id: String,
    },

    /// A snapshot's links would make it its own neighbor.
    SelfLink {
        /// Snapshot ID.
        snapshot_id: String,
    },

    /// A snapshot with this ID already exists.
    DuplicateSnapshot {
        /// Snapshot ID.
        snapshot_id: String,
    },
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SnapshotNotFound { snapshot_id } => {
                write!(f, "Snapshot not found: {snapshot_id}")
            }
            Self::SelfLink { snapshot_id } => {
                write!(f, "Snapshot links to itself: {snapshot_id}")
            }
            Self::DuplicateSnapshot { snapshot_id } => {
                write!(f, "Snapshot already exists: {snapshot_id}")
            }
        }
    }
}

impl std::error::Error for PositionError {}
