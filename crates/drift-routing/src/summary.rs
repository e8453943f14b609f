use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use drift_core::bloom::BloomFilter;
use drift_core::{BundleId, BundleMeta, Timestamp};
use thiserror::Error;

use crate::bundle_set::BundleIdSet;

/// Freshness lifecycle of a neighbor's summary filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// No filter received yet; one may be requested.
    Awaiting,
    /// A filter is present and fresh.
    Available,
    /// The filter outlived its advertised lifetime; a new one may be
    /// requested.
    Expired,
    /// The filter never goes stale; no further requests are ever needed.
    Final,
}

const STATE_AWAITING: u8 = 0;
const STATE_AVAILABLE: u8 = 1;
const STATE_EXPIRED: u8 = 2;
const STATE_FINAL: u8 = 3;

impl FilterState {
    fn from_u8(value: u8) -> Self {
        match value {
            STATE_AVAILABLE => FilterState::Available,
            STATE_EXPIRED => FilterState::Expired,
            STATE_FINAL => FilterState::Final,
            _ => FilterState::Awaiting,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            FilterState::Awaiting => STATE_AWAITING,
            FilterState::Available => STATE_AVAILABLE,
            FilterState::Expired => STATE_EXPIRED,
            FilterState::Final => STATE_FINAL,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    /// No usable filter: none received yet, or the last one went stale.
    #[error("summary filter is not available for this neighbor")]
    BloomfilterNotAvailable,
    /// A summary request is already outstanding, or none is needed.
    #[error("no summary request available for this neighbor")]
    NoFilterRequestAvailable,
}

/// What a neighbor is known or suspected to hold: an exact set fed by direct
/// observation, plus a bloom filter advertised by the neighbor itself.
///
/// The filter state lives in an atomic cell so the request gate can be
/// checked without taking the database lock.
#[derive(Debug)]
pub struct SummaryVector {
    filter: Option<BloomFilter>,
    expire_at: Timestamp,
    known: BundleIdSet,
    state: AtomicU8,
    request_pending: AtomicBool,
}

impl Default for SummaryVector {
    fn default() -> Self {
        Self {
            filter: None,
            expire_at: 0,
            known: BundleIdSet::default(),
            state: AtomicU8::new(STATE_AWAITING),
            request_pending: AtomicBool::new(false),
        }
    }
}

impl SummaryVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FilterState {
        FilterState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Replaces the filter unconditionally (no merge). A `lifetime` of zero
    /// marks the filter as never going stale.
    pub fn update(&mut self, filter: BloomFilter, lifetime: Timestamp, now: Timestamp) {
        self.filter = Some(filter);
        if lifetime == 0 {
            self.expire_at = 0;
            self.set_state(FilterState::Final);
        } else {
            self.expire_at = now + lifetime;
            self.set_state(FilterState::Available);
        }
        self.request_pending.store(false, Ordering::Relaxed);
    }

    /// Drops all collected knowledge. Used when the neighbor's identity is
    /// considered stale, e.g. after re-discovery.
    pub fn reset(&mut self) {
        self.filter = None;
        self.expire_at = 0;
        self.known.clear();
        self.set_state(FilterState::Awaiting);
        self.request_pending.store(false, Ordering::Relaxed);
    }

    /// Records exact knowledge of one bundle, independent of filter
    /// freshness. Fed by directly observed receptions and acknowledgements.
    pub fn add(&mut self, bundle: &BundleMeta) {
        self.known.insert(bundle);
    }

    /// Answers "does this neighbor already hold `id`".
    ///
    /// The exact set wins outright. Past that, `require_fresh` demands a
    /// usable filter; the probabilistic test may return a false positive but
    /// never a false negative for ids the filter was built with.
    pub fn has(&self, id: &BundleId, require_fresh: bool) -> Result<bool, SummaryError> {
        if self.known.contains(id) {
            return Ok(true);
        }
        if require_fresh
            && matches!(self.state(), FilterState::Awaiting | FilterState::Expired)
        {
            return Err(SummaryError::BloomfilterNotAvailable);
        }
        Ok(self.filter.as_ref().map_or(false, |f| f.contains(id)))
    }

    /// Grants permission to solicit one fresh summary from the neighbor.
    ///
    /// Gate-keeps duplicate concurrent requests through the atomic pending
    /// flag; the filter state itself only changes on `update` or `expire`.
    pub fn acquire_filter_request(&self) -> Result<(), SummaryError> {
        match self.state() {
            FilterState::Awaiting | FilterState::Expired => {}
            FilterState::Available | FilterState::Final => {
                return Err(SummaryError::NoFilterRequestAvailable)
            }
        }
        if self
            .request_pending
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return Err(SummaryError::NoFilterRequestAvailable);
        }
        Ok(())
    }

    /// Transitions a stale filter to `Expired` and prunes lapsed exact
    /// entries. A `Final` filter never expires.
    pub fn expire(&mut self, now: Timestamp) {
        if self.state() == FilterState::Available && now >= self.expire_at {
            self.set_state(FilterState::Expired);
            // a stale filter frees the request gate as well
            self.request_pending.store(false, Ordering::Relaxed);
        }
        self.known.expire(now);
    }

    fn set_state(&self, state: FilterState) {
        self.state.store(state.as_u8(), Ordering::Relaxed);
    }
}
