use std::any::Any;

use drift_core::bloom::BloomFilter;
use drift_core::{BundleId, BundleMeta, Eid, Timestamp};

use crate::config::RoutingConfig;
use crate::dataset::{DatasetError, DatasetRegistry};
use crate::summary::{FilterState, SummaryError, SummaryVector};
use crate::transfer::{TransferError, TransferLedger};

/// Collected knowledge about one directly reachable neighbor: summary
/// vector, in-flight transfer accounting, and routing-extension datasets.
///
/// Entries are owned exclusively by the [`crate::database::NeighborDatabase`]
/// and live until removed there.
#[derive(Debug)]
pub struct NeighborEntry {
    eid: Eid,
    summary: SummaryVector,
    transfers: TransferLedger,
    datasets: DatasetRegistry,
}

impl NeighborEntry {
    pub fn new(eid: Eid, config: &RoutingConfig) -> Self {
        Self {
            eid,
            summary: SummaryVector::new(),
            transfers: TransferLedger::new(
                config.max_transfer_slots,
                config.transfer_low_watermark,
            ),
            datasets: DatasetRegistry::new(),
        }
    }

    pub fn eid(&self) -> &Eid {
        &self.eid
    }

    /// Replaces this neighbor's advertised summary filter. See
    /// [`SummaryVector::update`].
    pub fn update_summary(&mut self, filter: BloomFilter, lifetime: Timestamp, now: Timestamp) {
        self.summary.update(filter, lifetime, now);
    }

    /// Drops all summary knowledge, e.g. after the neighbor was
    /// re-discovered under a stale identity.
    pub fn reset_summary(&mut self) {
        self.summary.reset();
    }

    /// Records a directly observed reception or acknowledgement.
    pub fn add_known(&mut self, bundle: &BundleMeta) {
        self.summary.add(bundle);
    }

    /// Whether this neighbor is known or suspected to hold `id`.
    pub fn has(&self, id: &BundleId, require_fresh: bool) -> Result<bool, SummaryError> {
        self.summary.has(id, require_fresh)
    }

    pub fn filter_state(&self) -> FilterState {
        self.summary.state()
    }

    /// Permission to solicit one fresh summary from this neighbor.
    pub fn acquire_filter_request(&self) -> Result<(), SummaryError> {
        self.summary.acquire_filter_request()
    }

    /// Claims a transfer slot for `id` toward this neighbor.
    pub fn acquire_transfer(&self, id: &BundleId) -> Result<(), TransferError> {
        self.transfers.acquire(id)
    }

    /// Returns a previously claimed transfer slot; idempotent.
    pub fn release_transfer(&self, id: &BundleId) {
        self.transfers.release(id)
    }

    pub fn free_transfer_slots(&self) -> usize {
        self.transfers.free_slots()
    }

    pub fn is_transfer_threshold_reached(&self) -> bool {
        self.transfers.is_threshold_reached()
    }

    /// Attaches routing-extension state, replacing any prior dataset of the
    /// same type.
    pub fn put_dataset<T: Any + Send + Sync>(&mut self, dataset: T) {
        self.datasets.put(dataset);
    }

    pub fn dataset<T: Any>(&self) -> Result<&T, DatasetError> {
        self.datasets.get::<T>()
    }

    pub fn dataset_mut<T: Any>(&mut self) -> Result<&mut T, DatasetError> {
        self.datasets.get_mut::<T>()
    }

    pub fn remove_dataset<T: Any>(&mut self) {
        self.datasets.remove::<T>();
    }

    /// Drives the expiry lifecycle of the summary vector.
    pub fn expire(&mut self, now: Timestamp) {
        self.summary.expire(now);
    }
}
