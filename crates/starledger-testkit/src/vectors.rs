//! Pinned header vectors.
//!
//! Each vector fixes the canonical header bytes for one set of block
//! fields. Any implementation that hashes blocks must produce exactly
//! these bytes, or its hashes will not match existing chains.

use starledger_core::{canonical_header_bytes, BlockHash};

/// A header test vector.
#[derive(Debug, Clone)]
pub struct HeaderVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub height: u64,
    pub previous_hash: [u8; 32],
    pub timestamp: i64,
    pub payload: &'static [u8],
    /// Expected canonical header bytes (hex).
    pub expected_header: &'static str,
}

impl HeaderVector {
    /// Encode this vector's fields.
    pub fn header_bytes(&self) -> Vec<u8> {
        canonical_header_bytes(
            self.height,
            &BlockHash::from_bytes(self.previous_hash),
            self.timestamp,
            self.payload,
        )
    }
}

/// Get all header vectors.
pub fn all_vectors() -> Vec<HeaderVector> {
    vec![
        HeaderVector {
            name: "height 0, zero previous hash, empty payload",
            height: 0,
            previous_hash: [0; 32],
            timestamp: 1_700_000_000,
            payload: b"",
            expected_header: "a400000158200000000000000000000000000000000000000000000000000000000000000000021a6553f1000340",
        },
        HeaderVector {
            name: "height 1 with short payload",
            height: 1,
            previous_hash: [0xab; 32],
            timestamp: 1_700_000_300,
            payload: b"hello",
            expected_header: "a40001015820abababababababababababababababababababababababababababababababab021a6553f22c034568656c6c6f",
        },
        HeaderVector {
            name: "two-byte height, negative timestamp, 24-byte payload",
            height: 300,
            previous_hash: [0x01; 32],
            timestamp: -1,
            payload: &[0x2a; 24],
            expected_header: "a40019012c015820010101010101010101010101010101010101010101010101010101010101010102200358182a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a",
        },
        HeaderVector {
            name: "extreme integers",
            height: u64::MAX,
            previous_hash: [0; 32],
            timestamp: i64::MIN,
            payload: &[0xff],
            expected_header: "a4001bffffffffffffffff0158200000000000000000000000000000000000000000000000000000000000000000023b7fffffffffffffff0341ff",
        },
    ]
}

/// Check every vector. Returns `(name, matches, actual_hex)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let actual = hex::encode(v.header_bytes());
            let matches = actual == v.expected_header;
            (v.name.to_string(), matches, actual)
        })
        .collect()
}
