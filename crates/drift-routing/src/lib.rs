//! Neighbor knowledge registry for the drift routing daemon.
//!
//! Tracks, per directly reachable neighbor, the bundles that neighbor is
//! known or suspected to already hold, bounded in-flight transfer
//! accounting, and typed per-neighbor state attached by routing extensions.

pub mod bundle_set;
pub mod config;
pub mod database;
pub mod dataset;
pub mod neighbor;
pub mod summary;
pub mod transfer;
