use std::fmt;

use serde::{Deserialize, Serialize};

/// 32-byte opaque bundle identifier (`hash(source, creation time, sequence)`).
pub type BundleId = [u8; 32];

/// Seconds on the daemon's monotonic clock.
pub type Timestamp = u64;

/// Endpoint identifier naming a network node.
///
/// Treated as an opaque comparable key; scheme parsing and validation happen
/// before values cross into this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Eid(String);

impl Eid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Eid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The slice of bundle metadata the routing layer consumes: identity plus
/// the moment the bundle itself lapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMeta {
    pub id: BundleId,
    pub expires_at: Timestamp,
}

impl BundleMeta {
    pub fn new(id: BundleId, expires_at: Timestamp) -> Self {
        Self { id, expires_at }
    }
}
