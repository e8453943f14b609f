use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use drift_core::{Eid, Timestamp};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::RoutingConfig;
use crate::neighbor::NeighborEntry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NeighborError {
    /// No entry exists for this identity.
    #[error("no entry for neighbor {0}")]
    NotAvailable(Eid),
}

/// Registry of collected knowledge about all known neighbors.
///
/// The map is guarded as a whole: every structural operation goes through
/// the guard returned by [`Self::lock`], and entry references borrow from
/// that guard, so no caller can hold an entry across a concurrent `remove`.
#[derive(Debug, Default)]
pub struct NeighborDatabase {
    entries: Mutex<HashMap<Eid, NeighborEntry>>,
    config: RoutingConfig,
}

impl NeighborDatabase {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Takes the database-wide exclusive lock. Hold the guard for the full
    /// duration of any entry access.
    pub fn lock(&self) -> NeighborDatabaseGuard<'_> {
        NeighborDatabaseGuard {
            entries: self.entries.lock().unwrap_or_else(|e| e.into_inner()),
            config: &self.config,
        }
    }
}

/// Exclusive view over the neighbor map.
pub struct NeighborDatabaseGuard<'a> {
    entries: MutexGuard<'a, HashMap<Eid, NeighborEntry>>,
    config: &'a RoutingConfig,
}

impl NeighborDatabaseGuard<'_> {
    pub fn get(&self, eid: &Eid) -> Result<&NeighborEntry, NeighborError> {
        self.entries
            .get(eid)
            .ok_or_else(|| NeighborError::NotAvailable(eid.clone()))
    }

    pub fn get_mut(&mut self, eid: &Eid) -> Result<&mut NeighborEntry, NeighborError> {
        self.entries
            .get_mut(eid)
            .ok_or_else(|| NeighborError::NotAvailable(eid.clone()))
    }

    /// Returns the entry for `eid`, constructing one first if none exists.
    pub fn create(&mut self, eid: &Eid) -> &mut NeighborEntry {
        let config = self.config;
        self.entries.entry(eid.clone()).or_insert_with(|| {
            debug!(neighbor = %eid, "neighbor entry created");
            NeighborEntry::new(eid.clone(), config)
        })
    }

    /// Deletes the entry for `eid` and everything it owns; no-op when
    /// absent.
    pub fn remove(&mut self, eid: &Eid) {
        if self.entries.remove(eid).is_some() {
            debug!(neighbor = %eid, "neighbor entry removed");
        }
    }

    /// Fans the maintenance tick out to every entry. Removes nothing:
    /// absence of traffic is not absence of the neighbor.
    pub fn expire(&mut self, now: Timestamp) {
        trace!(now, neighbors = self.entries.len(), "neighbor expiry sweep");
        for entry in self.entries.values_mut() {
            entry.expire(now);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
