use std::collections::HashSet;
use std::sync::Mutex;

use drift_core::BundleId;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    /// This bundle already occupies a slot toward the neighbor.
    #[error("bundle is already in transit to this neighbor")]
    AlreadyInTransit,
    /// Every transfer slot toward the neighbor is taken.
    #[error("no transfer slots available for this neighbor")]
    NoSlotsAvailable,
}

/// Bounded accounting of in-flight transfers toward one neighbor.
///
/// Carries its own lock, scoped strictly to the in-transit set, so the
/// highest-frequency operations never contend with database-wide structural
/// changes.
#[derive(Debug)]
pub struct TransferLedger {
    in_transit: Mutex<HashSet<BundleId>>,
    max_slots: usize,
    low_watermark: f32,
}

impl TransferLedger {
    pub fn new(max_slots: usize, low_watermark: f32) -> Self {
        Self {
            in_transit: Mutex::new(HashSet::new()),
            max_slots,
            low_watermark,
        }
    }

    /// Claims a slot for `id`. Fails without side effects when the bundle is
    /// already in transit or the ledger is at capacity.
    pub fn acquire(&self, id: &BundleId) -> Result<(), TransferError> {
        let mut in_transit = self.in_transit.lock().unwrap_or_else(|e| e.into_inner());
        if in_transit.contains(id) {
            return Err(TransferError::AlreadyInTransit);
        }
        if in_transit.len() >= self.max_slots {
            return Err(TransferError::NoSlotsAvailable);
        }
        in_transit.insert(*id);
        trace!(bundle = %hex::encode(&id[..8]), "transfer slot acquired");
        Ok(())
    }

    /// Returns the slot held by `id`. Idempotent; releasing an id that holds
    /// no slot is a no-op.
    pub fn release(&self, id: &BundleId) {
        let mut in_transit = self.in_transit.lock().unwrap_or_else(|e| e.into_inner());
        if in_transit.remove(id) {
            trace!(bundle = %hex::encode(&id[..8]), "transfer slot released");
        }
    }

    /// Point-in-time snapshot of remaining slots; advisory only under
    /// concurrent access.
    pub fn free_slots(&self) -> usize {
        let in_transit = self.in_transit.lock().unwrap_or_else(|e| e.into_inner());
        self.max_slots - in_transit.len()
    }

    /// Soft backpressure signal: free slots at or below the low-watermark
    /// fraction of capacity. Distinct from the hard capacity failure in
    /// [`Self::acquire`].
    pub fn is_threshold_reached(&self) -> bool {
        self.free_slots() as f32 <= self.max_slots as f32 * self.low_watermark
    }

}
