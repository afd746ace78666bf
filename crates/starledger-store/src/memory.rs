//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use starledger_core::{Block, BlockHash};

use crate::error::Result;
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blocks: RwLock<BTreeMap<u64, Block>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the block at its height, bypassing conflict checks.
    ///
    /// Simulates out-of-band edits to stored data.
    pub fn overwrite(&self, block: Block) {
        let mut blocks = self.blocks.write().unwrap_or_else(PoisonError::into_inner);
        blocks.insert(block.height(), block);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_block(&self, block: &Block) -> Result<InsertResult> {
        let mut blocks = self.blocks.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = blocks.get(&block.height()) {
            if existing == block {
                return Ok(InsertResult::AlreadyExists);
            }
            return Ok(InsertResult::Conflict {
                existing: *existing.hash(),
            });
        }

        blocks.insert(block.height(), block.clone());
        Ok(InsertResult::Inserted)
    }

    async fn get_block(&self, height: u64) -> Result<Option<Block>> {
        let blocks = self.blocks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(blocks.get(&height).cloned())
    }

    async fn get_block_by_hash(&self, hash: &BlockHash) -> Result<Option<Block>> {
        let blocks = self.blocks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(blocks.values().find(|block| block.hash() == hash).cloned())
    }

    async fn load_chain(&self) -> Result<Vec<Block>> {
        let blocks = self.blocks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(blocks.values().cloned().collect())
    }

    async fn block_count(&self) -> Result<u64> {
        let blocks = self.blocks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(blocks.len() as u64)
    }
}
