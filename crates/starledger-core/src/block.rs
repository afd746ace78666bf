//! Block: one sealed entry in the ledger.
//!
//! A block is immutable once sealed. There are no mutators; a block read
//! back from storage is rebuilt with [`Block::from_parts`], which keeps the
//! stored hash as-is so that tampering stays detectable.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::canonical::canonical_header_bytes;
use crate::error::CoreError;
use crate::payload::Payload;
use crate::types::BlockHash;

/// A sealed block: header fields, opaque payload, and the hash over them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    height: u64,
    previous_hash: BlockHash,
    /// Seconds since the Unix epoch, assigned at append time.
    timestamp: i64,
    payload: Bytes,
    hash: BlockHash,
}

impl Block {
    /// Seal a new block, computing its hash.
    pub fn seal(
        payload: impl Into<Bytes>,
        height: u64,
        previous_hash: BlockHash,
        timestamp: i64,
    ) -> Self {
        let payload = payload.into();
        let hash = compute_hash(height, &previous_hash, timestamp, &payload);
        Self {
            height,
            previous_hash,
            timestamp,
            payload,
            hash,
        }
    }

    /// Seal the genesis block: height 0, zero previous hash, fixed marker.
    pub fn genesis(timestamp: i64) -> Result<Self, CoreError> {
        let payload = Payload::genesis().encode()?;
        Ok(Self::seal(payload, 0, BlockHash::ZERO, timestamp))
    }

    /// Rebuild a block from stored fields without recomputing its hash.
    pub fn from_parts(
        height: u64,
        previous_hash: BlockHash,
        timestamp: i64,
        payload: impl Into<Bytes>,
        hash: BlockHash,
    ) -> Self {
        Self {
            height,
            previous_hash,
            timestamp,
            payload: payload.into(),
            hash,
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn previous_hash(&self) -> &BlockHash {
        &self.previous_hash
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The stored hash.
    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    /// The payload bytes exactly as sealed.
    pub fn payload_bytes(&self) -> &Bytes {
        &self.payload
    }

    /// Decode the payload.
    pub fn decode_payload(&self) -> Result<Payload, CoreError> {
        Payload::decode(&self.payload)
    }

    /// Check if this is the first block of a chain.
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Recompute the hash over the current fields.
    pub fn compute_hash(&self) -> BlockHash {
        compute_hash(self.height, &self.previous_hash, self.timestamp, &self.payload)
    }

    /// Whether the stored hash matches the fields. Side-effect free.
    pub fn validate(&self) -> bool {
        self.compute_hash() == self.hash
    }
}

fn compute_hash(height: u64, previous_hash: &BlockHash, timestamp: i64, payload: &[u8]) -> BlockHash {
    BlockHash::digest(&canonical_header_bytes(height, previous_hash, timestamp, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{Star, StarClaim};

    fn claim_payload() -> Bytes {
        Payload::from(StarClaim {
            address: "addr".into(),
            signature: "sig".into(),
            message: "addr:100:starRegistry".into(),
            star: Star::default(),
        })
        .encode()
        .unwrap()
    }

    #[test]
    fn test_seal_and_validate() {
        let block = Block::seal(claim_payload(), 1, BlockHash::from_bytes([9; 32]), 1_700_000_000);

        assert_eq!(block.height(), 1);
        assert_eq!(block.timestamp(), 1_700_000_000);
        assert!(block.validate());
        assert_eq!(block.compute_hash(), *block.hash());
    }

    #[test]
    fn test_hash_is_deterministic() {
        let prev = BlockHash::from_bytes([1; 32]);
        let a = Block::seal(claim_payload(), 3, prev, 42);
        let b = Block::seal(claim_payload(), 3, prev, 42);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_genesis() {
        let genesis = Block::genesis(1_000).unwrap();

        assert!(genesis.is_genesis());
        assert!(genesis.previous_hash().is_zero());
        assert!(genesis.validate());
        assert!(genesis.decode_payload().unwrap().is_genesis());
    }

    #[test]
    fn test_payload_bytes_unchanged() {
        let payload = claim_payload();
        let block = Block::seal(payload.clone(), 1, BlockHash::ZERO, 5);
        assert_eq!(block.payload_bytes(), &payload);
    }

    #[test]
    fn test_tampered_fields_fail_validation() {
        let block = Block::seal(claim_payload(), 2, BlockHash::from_bytes([7; 32]), 500);
        let hash = *block.hash();

        let payload = Block::from_parts(2, *block.previous_hash(), 500, b"forged".to_vec(), hash);
        let height = Block::from_parts(3, *block.previous_hash(), 500, block.payload_bytes().clone(), hash);
        let time = Block::from_parts(2, *block.previous_hash(), 501, block.payload_bytes().clone(), hash);
        let prev = Block::from_parts(2, BlockHash::ZERO, 500, block.payload_bytes().clone(), hash);

        for forged in [payload, height, time, prev] {
            assert!(!forged.validate());
        }
    }

    #[test]
    fn test_from_parts_preserves_valid_block() {
        let block = Block::seal(claim_payload(), 1, BlockHash::ZERO, 99);
        let restored = Block::from_parts(
            block.height(),
            *block.previous_hash(),
            block.timestamp(),
            block.payload_bytes().clone(),
            *block.hash(),
        );
        assert_eq!(block, restored);
        assert!(restored.validate());
    }
}
