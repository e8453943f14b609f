use serde::{Deserialize, Serialize};

/// Tunable knobs for per-neighbor bookkeeping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Maximum concurrent outbound transfers per neighbor.
    pub max_transfer_slots: usize,
    /// Fraction of `max_transfer_slots` at or below which the soft
    /// backpressure signal fires.
    pub transfer_low_watermark: f32,
    /// Salt mixed into locally built summary filters.
    pub summary_salt: [u8; 16],
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_transfer_slots: 5,
            transfer_low_watermark: 0.2,
            summary_salt: [0; 16],
        }
    }
}
