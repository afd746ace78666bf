//! Store trait: the abstract interface for block persistence.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use starledger_core::{Block, BlockHash};

use crate::error::Result;

/// Result of inserting a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Block was inserted successfully.
    Inserted,
    /// The identical block is already stored (idempotent - not an error).
    AlreadyExists,
    /// Conflict: a different block is stored at the same height.
    Conflict {
        /// Hash of the block already at this height.
        existing: BlockHash,
    },
}

/// The Store trait: async interface for block persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, blocking work runs on `spawn_blocking`.
///
/// Blocks are stored with every sealed field verbatim, including the hash.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a sealed block, keyed by height.
    ///
    /// # Returns
    /// - `Inserted` if the height was free.
    /// - `AlreadyExists` if the exact same block is already stored.
    /// - `Conflict` if a different block occupies the height.
    async fn insert_block(&self, block: &Block) -> Result<InsertResult>;

    /// Get the block at a height.
    async fn get_block(&self, height: u64) -> Result<Option<Block>>;

    /// Get the lowest-height block whose stored hash equals `hash`.
    async fn get_block_by_hash(&self, hash: &BlockHash) -> Result<Option<Block>>;

    /// Load every stored block, ordered by height.
    async fn load_chain(&self) -> Result<Vec<Block>>;

    /// Number of stored blocks.
    async fn block_count(&self) -> Result<u64>;
}
