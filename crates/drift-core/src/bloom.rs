use serde::{Deserialize, Serialize};

use crate::types::{BundleId, Timestamp};

const SUMMARY_EXCHANGE_V1: u16 = 1;
const SUMMARY_PACKET_MAGIC: &[u8] = b"DRIFT_SUMMARY_V1";

/// Salted bloom filter compressing one node's bundle holdings.
///
/// False positives are possible; an item inserted at build time is never
/// reported absent. The salt keeps independently built filters from sharing
/// bit patterns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BloomFilter {
    pub bit_len: usize,
    pub hash_count: u8,
    pub salt: [u8; 16],
    pub bits: Vec<u8>,
}

impl BloomFilter {
    pub fn new(bit_len: usize, hash_count: u8, salt: [u8; 16]) -> Self {
        let bit_len = bit_len.max(8);
        Self {
            bit_len,
            hash_count: hash_count.max(1),
            salt,
            bits: vec![0; bit_len.div_ceil(8)],
        }
    }

    /// Sizes a filter for `expected_items` at the given false positive rate
    /// using the standard `m = -n ln p / (ln 2)^2`, `k = (m/n) ln 2` bounds.
    pub fn recommended(expected_items: usize, false_positive_rate: f64, salt: [u8; 16]) -> Self {
        let n = expected_items.max(1) as f64;
        let p = false_positive_rate.clamp(0.000_1, 0.999_9);
        let ln2 = std::f64::consts::LN_2;
        let m = (-(n * p.ln()) / (ln2 * ln2)).ceil() as usize;
        let k = ((m as f64 / n) * ln2).round().clamp(1.0, 16.0) as u8;
        Self::new(m.max(256), k, salt)
    }

    pub fn insert(&mut self, id: &BundleId) {
        let (h1, h2) = self.index_pair(id);
        for round in 0..u64::from(self.hash_count) {
            let idx = (h1.wrapping_add(round.wrapping_mul(h2)) as usize) % self.bit_len;
            self.bits[idx / 8] |= 1 << (idx % 8);
        }
    }

    pub fn contains(&self, id: &BundleId) -> bool {
        let (h1, h2) = self.index_pair(id);
        (0..u64::from(self.hash_count)).all(|round| {
            let idx = (h1.wrapping_add(round.wrapping_mul(h2)) as usize) % self.bit_len;
            self.bits[idx / 8] & (1 << (idx % 8)) != 0
        })
    }

    /// Size of the bit table in bytes, used for exchange budgeting.
    pub fn byte_len(&self) -> usize {
        self.bits.len()
    }

    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    // Double hashing: one blake3 digest yields both strides. h2 is forced
    // odd so successive rounds cover the whole table.
    fn index_pair(&self, id: &BundleId) -> (u64, u64) {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"drift-summary-v1");
        hasher.update(&self.salt);
        hasher.update(id);
        let digest = *hasher.finalize().as_bytes();
        let h1 = u64::from_be_bytes([
            digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
        ]);
        let h2 = u64::from_be_bytes([
            digest[8], digest[9], digest[10], digest[11], digest[12], digest[13], digest[14],
            digest[15],
        ]) | 1;
        (h1, h2)
    }
}

/// Wire message carrying one node's summary filter and its advertised
/// lifetime. A lifetime of zero marks the filter as never going stale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryExchange {
    pub version: u16,
    pub lifetime: Timestamp,
    pub filter: BloomFilter,
}

pub fn encode_summary_cbor(
    lifetime: Timestamp,
    filter: BloomFilter,
) -> Result<Vec<u8>, serde_cbor::Error> {
    serde_cbor::to_vec(&SummaryExchange {
        version: SUMMARY_EXCHANGE_V1,
        lifetime,
        filter,
    })
}

pub fn decode_summary_cbor(bytes: &[u8]) -> Result<SummaryExchange, serde_cbor::Error> {
    serde_cbor::from_slice(bytes)
}

pub fn encode_summary_packet(
    lifetime: Timestamp,
    filter: BloomFilter,
) -> Result<Vec<u8>, serde_cbor::Error> {
    let payload = encode_summary_cbor(lifetime, filter)?;
    let mut out = Vec::with_capacity(SUMMARY_PACKET_MAGIC.len() + payload.len());
    out.extend_from_slice(SUMMARY_PACKET_MAGIC);
    out.extend_from_slice(&payload);
    Ok(out)
}

pub fn decode_summary_packet(bytes: &[u8]) -> Option<SummaryExchange> {
    if bytes.len() <= SUMMARY_PACKET_MAGIC.len() {
        return None;
    }
    if &bytes[..SUMMARY_PACKET_MAGIC.len()] != SUMMARY_PACKET_MAGIC {
        return None;
    }
    decode_summary_cbor(&bytes[SUMMARY_PACKET_MAGIC.len()..]).ok()
}
