//! Core drift primitives shared across crates.
//!
//! Includes bundle and endpoint identifier types, bundle metadata, and the
//! salted bloom filter used to exchange summary vectors between nodes.

pub mod bloom;
pub mod types;

pub use types::{BundleId, BundleMeta, Eid, Timestamp};
