//! The Ledger: an ordered, hash-linked chain of blocks.
//!
//! The chain lives behind a single `RwLock`. Appends take the write lock
//! for the whole read-tip, seal, push sequence, so two appends can never
//! observe the same tip. Reads clone what they need under the read lock
//! and see the chain either fully before or fully after an append.
//!
//! A ledger is never empty: every constructor either seals a genesis
//! block or requires one.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use tracing::{debug, info, warn};

use starledger_core::{
    validate_block, validate_link, Block, BlockHash, Clock, Payload, StarClaim, SystemClock,
    ValidationError,
};

use crate::error::LedgerError;

/// Result of scanning the chain for one identity's claims.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimScan {
    /// Matching claims, in chain order.
    pub claims: Vec<StarClaim>,
    /// Heights whose payload could not be decoded.
    pub undecodable: Vec<u64>,
}

/// A lock-guarded chain of blocks.
pub struct Ledger {
    blocks: RwLock<Vec<Block>>,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Create a ledger holding only a genesis block, timestamped by the system clock.
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a ledger holding only a genesis block.
    ///
    /// The genesis block is sealed before this returns, so no other
    /// operation can see the ledger without it.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Result<Self, LedgerError> {
        let genesis = Block::genesis(clock.now())?;
        info!(hash = %genesis.hash(), "sealed genesis block");

        Ok(Self {
            blocks: RwLock::new(vec![genesis]),
            clock,
        })
    }

    /// Restore a ledger from previously sealed blocks, kept verbatim.
    ///
    /// Only the presence of a genesis block at position 0 is required.
    /// Hashes and links are not checked here; use [`Ledger::audit`].
    pub fn from_blocks(blocks: Vec<Block>, clock: Arc<dyn Clock>) -> Result<Self, LedgerError> {
        match blocks.first() {
            Some(first) if first.is_genesis() => {}
            _ => return Err(LedgerError::MissingGenesis),
        }

        debug!(blocks = blocks.len(), "restored ledger");
        Ok(Self {
            blocks: RwLock::new(blocks),
            clock,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Block>> {
        self.blocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Block>> {
        self.blocks.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Height of the newest block. Always `block_count() - 1`.
    pub fn height(&self) -> u64 {
        (self.read().len() as u64).saturating_sub(1)
    }

    /// Number of blocks, genesis included.
    pub fn block_count(&self) -> u64 {
        self.read().len() as u64
    }

    /// The newest block.
    pub fn tip(&self) -> Option<Block> {
        self.read().last().cloned()
    }

    /// Encode a payload and append it as a new block.
    pub fn append(&self, payload: &Payload) -> Result<Block, LedgerError> {
        let bytes = payload.encode()?;
        Ok(self.append_bytes(bytes))
    }

    /// Append raw payload bytes as a new block.
    pub fn append_bytes(&self, payload: impl Into<Bytes>) -> Block {
        let mut blocks = self.write();
        let (height, previous_hash) = next_position(&blocks);
        let block = Block::seal(payload, height, previous_hash, self.clock.now());
        blocks.push(block.clone());
        drop(blocks);

        info!(height, hash = %block.hash(), "appended block");
        block
    }

    /// Seal a block that would extend the current tip, without appending it.
    ///
    /// The block is only accepted by [`Ledger::push`] if the tip has not
    /// moved in between.
    pub(crate) fn seal_next(&self, payload: impl Into<Bytes>) -> Block {
        let (height, previous_hash) = next_position(&self.read());
        Block::seal(payload, height, previous_hash, self.clock.now())
    }

    /// Append a block sealed by [`Ledger::seal_next`].
    pub(crate) fn push(&self, block: Block) -> Result<(), LedgerError> {
        let mut blocks = self.write();
        let (height, previous_hash) = next_position(&blocks);

        if block.height() != height || *block.previous_hash() != previous_hash {
            return Err(LedgerError::StaleTip {
                expected: height,
                got: block.height(),
            });
        }

        info!(height, hash = %block.hash(), "appended block");
        blocks.push(block);
        Ok(())
    }

    /// First block whose stored hash equals `hash`.
    pub fn get_by_hash(&self, hash: &BlockHash) -> Option<Block> {
        self.read().iter().find(|block| block.hash() == hash).cloned()
    }

    /// Block at position `height`.
    pub fn get_by_height(&self, height: u64) -> Option<Block> {
        let index = usize::try_from(height).ok()?;
        self.read().get(index).cloned()
    }

    /// Decode every non-genesis payload and collect the claims owned by `identity`.
    ///
    /// Undecodable payloads are skipped and reported, never fatal.
    pub fn scan_claims(&self, identity: &str) -> ClaimScan {
        let mut scan = ClaimScan::default();

        for (height, block) in self.blocks().iter().enumerate().skip(1) {
            match block.decode_payload() {
                Ok(Payload::StarClaim(claim)) if claim.address == identity => {
                    scan.claims.push(claim);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(height, error = %e, "skipping undecodable payload");
                    scan.undecodable.push(height as u64);
                }
            }
        }

        scan
    }

    /// Claims owned by `identity`, in chain order.
    pub fn get_payloads_by_identity(&self, identity: &str) -> Vec<StarClaim> {
        self.scan_claims(identity).claims
    }

    /// Whether any claim on the chain was made with this challenge message.
    pub fn contains_message(&self, message: &str) -> bool {
        self.blocks().iter().skip(1).any(|block| {
            matches!(
                block.decode_payload(),
                Ok(Payload::StarClaim(claim)) if claim.message == message
            )
        })
    }

    /// Full audit: every block's hash, then every link.
    ///
    /// Errors carry the block's position in the chain. A position may
    /// appear twice when both checks fail for it.
    pub fn audit(&self) -> Vec<ValidationError> {
        let blocks = self.blocks();

        let hash_errors = blocks
            .iter()
            .enumerate()
            .filter_map(|(i, block)| validate_block(block, i as u64).err());

        let link_errors = blocks
            .windows(2)
            .enumerate()
            .filter_map(|(i, pair)| validate_link(&pair[0], &pair[1], i as u64 + 1).err());

        hash_errors.chain(link_errors).collect()
    }

    /// Heights of all blocks that fail the audit. Empty for a sound chain.
    pub fn validate(&self) -> Vec<u64> {
        let heights: Vec<u64> = self.audit().iter().map(ValidationError::height).collect();
        if !heights.is_empty() {
            warn!(?heights, "chain validation failed");
        }
        heights
    }

    /// Snapshot of the whole chain.
    pub fn blocks(&self) -> Vec<Block> {
        self.read().clone()
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

/// Height and previous hash for the block after `blocks`.
fn next_position(blocks: &[Block]) -> (u64, BlockHash) {
    match blocks.last() {
        Some(tip) => (blocks.len() as u64, *tip.hash()),
        None => (0, BlockHash::ZERO),
    }
}
