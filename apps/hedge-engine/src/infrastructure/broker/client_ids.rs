//! Broker connection-identifier pool.
//!
//! The broker rejects two concurrent sessions that present the same client
//! id, so ids are leased out of a fixed range and returned when a session
//! ends. The check-and-mark is a single compare-and-swap per slot: two
//! concurrent `acquire` calls can never be handed the same id.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Errors from the client-id pool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientIdError {
    /// Every id in the configured range is currently leased.
    #[error("all client ids in [{min_id}, {max_id}] are leased")]
    Exhausted {
        /// Lowest id in the pool.
        min_id: u32,
        /// Highest id in the pool.
        max_id: u32,
    },
}

/// Lease pool for broker client ids over an inclusive range.
#[derive(Debug)]
pub struct ClientIdPool {
    min_id: u32,
    slots: Vec<AtomicBool>,
}

impl ClientIdPool {
    /// Create a pool over the inclusive range `[min_id, max_id]`.
    ///
    /// # Panics
    ///
    /// Panics if `max_id < min_id`.
    #[must_use]
    pub fn new(min_id: u32, max_id: u32) -> Self {
        assert!(max_id >= min_id, "client id range must not be empty");
        let size = (max_id - min_id + 1) as usize;
        let mut slots = Vec::with_capacity(size);
        slots.resize_with(size, AtomicBool::default);
        Self { min_id, slots }
    }

    /// Number of ids in the range.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of ids currently leased.
    #[must_use]
    pub fn leased(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.load(Ordering::Acquire))
            .count()
    }

    /// Lease an unused id, marking it used in the same atomic operation.
    ///
    /// # Errors
    ///
    /// Returns `ClientIdError::Exhausted` when every id is leased.
    pub fn acquire(&self) -> Result<u32, ClientIdError> {
        for (offset, slot) in self.slots.iter().enumerate() {
            if slot
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                let id = self.min_id + offset as u32;
                debug!(client_id = id, "leased client id");
                return Ok(id);
            }
        }
        Err(ClientIdError::Exhausted {
            min_id: self.min_id,
            max_id: self.min_id + (self.slots.len() - 1) as u32,
        })
    }

    /// Return a leased id to the pool. Releasing an id that is already free
    /// (or outside the range) is a no-op.
    pub fn release(&self, id: u32) {
        let Some(offset) = id.checked_sub(self.min_id) else {
            return;
        };
        if let Some(slot) = self.slots.get(offset as usize) {
            slot.store(false, Ordering::Release);
            debug!(client_id = id, "released client id");
        }
    }

    /// Lease an id, retrying with jittered backoff while the pool is
    /// exhausted. For callers that prefer waiting over failing fast.
    ///
    /// # Errors
    ///
    /// Returns `ClientIdError::Exhausted` once `max_attempts` have failed.
    pub async fn acquire_with_retry(
        &self,
        max_attempts: u32,
        base_delay: Duration,
    ) -> Result<u32, ClientIdError> {
        let mut last_err = ClientIdError::Exhausted {
            min_id: self.min_id,
            max_id: self.min_id + (self.slots.len() - 1) as u32,
        };
        for attempt in 0..max_attempts {
            match self.acquire() {
                Ok(id) => return Ok(id),
                Err(err) => last_err = err,
            }
            let jitter_ms = rand::rng().random_range(0..=base_delay.as_millis() as u64);
            let delay = base_delay * attempt.saturating_add(1) + Duration::from_millis(jitter_ms);
            tokio::time::sleep(delay).await;
        }
        Err(last_err)
    }
}
