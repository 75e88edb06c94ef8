//! Fixed-capacity admission gate for statement preparation.
//!
//! Every [`TableBuilder`](crate::TableBuilder) that shares a gate competes for
//! the same permits, so at most `capacity` prepare+execute attempts are in
//! flight across all of them. The gate bounds concurrency only; it does not
//! order statements.

use crate::error::{TableError, TableResult};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Shared counting semaphore. Cloning shares the same permits.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held slot. Dropping it returns the slot to the gate.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Create a gate with `capacity` slots. A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    ///
    /// Cancel-safe: dropping the returned future before it resolves takes no slot.
    pub async fn acquire(&self) -> TableResult<GatePermit> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| TableError::GateClosed)?;
        Ok(GatePermit { _permit: permit })
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots free right now. Diagnostic only, the value may be stale on return.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Close the gate. Pending and future `acquire` calls fail with
    /// [`TableError::GateClosed`]; permits already held stay valid.
    pub fn close(&self) {
        self.semaphore.close();
    }
}
